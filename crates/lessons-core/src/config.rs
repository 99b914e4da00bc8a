//! Tunables for deduplication, clustering and matching

use lessons_index::{DirectorySource, MatchParams};
use lessons_store::Paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration; `<claude-home>/lessons.json` may override any field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tag-set Jaccard similarity must exceed this to join a group
    pub jaccard_threshold: f64,

    /// Keywords in more than this share of artifacts are generic
    pub generic_ratio: f64,

    /// Minimum overlap score for an update recommendation
    pub match_threshold: f64,

    /// Flat bonus when a tag and an artifact name contain one another
    pub name_bonus: f64,

    /// Max update targets per group
    pub max_targets: usize,

    /// Recent observations checked for duplicate fingerprints
    pub dedup_window: usize,

    pub min_summary_len: usize,

    /// Reflect batch / result size when the request gives none
    pub default_limit: usize,

    /// Records shown in the stats view
    pub recent_count: usize,

    pub rules_dir: Option<PathBuf>,
    pub hooks_dir: Option<PathBuf>,
    pub skills_dir: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            jaccard_threshold: 0.3,
            generic_ratio: 0.4,
            match_threshold: 3.0,
            name_bonus: 5.0,
            max_targets: 2,
            dedup_window: 100,
            min_summary_len: 20,
            default_limit: 50,
            recent_count: 5,
            rules_dir: None,
            hooks_dir: None,
            skills_dir: None,
        }
    }

    /// Read overrides from `path`; missing or malformed files give defaults
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "config unreadable, using defaults"
                );
                return Self::new();
            }
        };

        match serde_json::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "config malformed, using defaults"
                );
                Self::new()
            }
        }
    }

    pub fn match_params(&self) -> MatchParams {
        MatchParams {
            min_score: self.match_threshold,
            name_bonus: self.name_bonus,
            max_targets: self.max_targets,
        }
    }

    /// Artifact directories, falling back to the standard layout
    pub fn artifact_source(&self, paths: &Paths) -> DirectorySource {
        DirectorySource::new(
            self.rules_dir.clone().unwrap_or_else(|| paths.rules_dir()),
            self.hooks_dir.clone().unwrap_or_else(|| paths.hooks_dir()),
            self.skills_dir.clone().unwrap_or_else(|| paths.skills_dir()),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
