//! Durable state for the learning loop: the observation log and its paths

mod io;
mod log;
mod paths;
mod types;

pub use io::{append_jsonl, atomic_write, read_lines};
pub use log::{ObservationFilter, ObservationLog};
pub use paths::{Paths, CONFIG_DIR_ENV};
pub use types::{
    generate_id, ArtifactType, Observation, ObservationContext, RawObservation, Source,
    UNKNOWN_SESSION,
};
