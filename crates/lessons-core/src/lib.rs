//! Observation clustering and artifact-matching engine

mod classify;
mod cluster;
mod config;
mod dedup;
mod engine;
mod error;
mod types;

pub use classify::{classify, default_recommendation};
pub use cluster::{cluster, jaccard, ObservationGroup};
pub use config::Config;
pub use dedup::{fingerprint, is_duplicate};
pub use engine::{Engine, GUIDANCE};
pub use error::{LessonsError, Result};
pub use types::{
    Action, GroupReport, MemberSummary, ObserveOutcome, ObserveRequest, RecentEntry,
    ReflectOutcome, ReflectRequest, StatsView, Target,
};
