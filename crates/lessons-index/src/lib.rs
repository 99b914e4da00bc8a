//! Artifact discovery and IDF-weighted overlap matching

mod corpus;
mod overlap;
mod scanner;
mod tokenize;

pub use corpus::CorpusIndex;
pub use overlap::{score_artifacts, MatchParams, ScoredArtifact};
pub use scanner::{ArtifactKind, ArtifactSource, DirectorySource, ExistingArtifact};
pub use tokenize::{keywords, MIN_KEYWORD_LEN};
