//! Path resolution under the assistant configuration directory

use std::path::PathBuf;

/// Overrides the default `~/.claude` location when set
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Resolves standard paths for the observation log and artifact directories
#[derive(Debug, Clone)]
pub struct Paths {
    pub home_claude: PathBuf,
}

impl Paths {
    /// Resolve from `CLAUDE_CONFIG_DIR`, falling back to `~/.claude`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::from_home(dir));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::from_home(home.join(".claude")))
    }

    /// Use an explicit configuration directory
    pub fn from_home(home_claude: impl Into<PathBuf>) -> Self {
        Self {
            home_claude: home_claude.into(),
        }
    }

    pub fn lessons_dir(&self) -> PathBuf {
        self.home_claude.join("lessons")
    }

    /// Get observations.jsonl path
    pub fn observations_file(&self) -> PathBuf {
        self.lessons_dir().join("observations.jsonl")
    }

    /// Get lessons.json (tuning overrides) path
    pub fn config_file(&self) -> PathBuf {
        self.home_claude.join("lessons.json")
    }

    pub fn rules_dir(&self) -> PathBuf {
        self.home_claude.join("rules")
    }

    pub fn hooks_dir(&self) -> PathBuf {
        self.home_claude.join("hooks")
    }

    pub fn skills_dir(&self) -> PathBuf {
        self.home_claude.join("skills")
    }
}
