pub mod observe;
pub mod reflect;
pub mod serve;
pub mod stats;
pub mod version;

use lessons_core::{Config, Engine};
use lessons_index::DirectorySource;
use lessons_store::{ObservationLog, Paths, UNKNOWN_SESSION};

/// Set by the assistant for the current conversation
pub const SESSION_ENV: &str = "CLAUDE_SESSION_ID";

pub fn session_id() -> String {
    std::env::var(SESSION_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_SESSION.to_string())
}

/// Engine over the standard paths with `lessons.json` overrides applied
pub fn open_engine() -> anyhow::Result<Engine<DirectorySource>> {
    let paths = Paths::new()?;
    let config = Config::load(&paths.config_file());
    let source = config.artifact_source(&paths);
    tracing::debug!(home = %paths.home_claude.display(), "engine opened");

    Ok(Engine::new(
        ObservationLog::new(paths.observations_file()),
        source,
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_session_id_from_env() {
        std::env::set_var(SESSION_ENV, " abc-123 ");
        assert_eq!(session_id(), "abc-123");
        std::env::remove_var(SESSION_ENV);
    }

    #[test]
    #[serial]
    fn test_session_id_sentinel() {
        std::env::remove_var(SESSION_ENV);
        assert_eq!(session_id(), UNKNOWN_SESSION);

        std::env::set_var(SESSION_ENV, "   ");
        assert_eq!(session_id(), UNKNOWN_SESSION);
        std::env::remove_var(SESSION_ENV);
    }

    #[test]
    #[serial]
    fn test_open_engine_honors_config_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("lessons.json"),
            r#"{"min_summary_len": 5}"#,
        )
        .unwrap();
        std::env::set_var(lessons_store::CONFIG_DIR_ENV, temp.path());

        let engine = open_engine().unwrap();
        assert_eq!(engine.config().min_summary_len, 5);
        assert_eq!(
            engine.log().path(),
            temp.path().join("lessons").join("observations.jsonl")
        );

        std::env::remove_var(lessons_store::CONFIG_DIR_ENV);
    }
}
