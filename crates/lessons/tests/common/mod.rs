#![allow(dead_code)]

use lessons_core::{Config, Engine, ObserveRequest};
use lessons_index::DirectorySource;
use lessons_store::{ObservationLog, Paths};
use std::path::Path;
use tempfile::TempDir;

/// Engine over a throwaway config directory with the standard layout
pub fn engine_in(temp: &TempDir) -> Engine<DirectorySource> {
    let paths = Paths::from_home(temp.path());
    let config = Config::new();
    let source = config.artifact_source(&paths);
    Engine::new(ObservationLog::new(paths.observations_file()), source, config)
}

pub fn write_rule(home: &Path, name: &str, text: &str) {
    let dir = home.join("rules");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.md", name)), text).unwrap();
}

pub fn write_skill(home: &Path, name: &str, description: &str, body: &str) {
    let dir = home.join("skills").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("SKILL.md"),
        format!("---\nname: {}\ndescription: {}\n---\n\n{}\n", name, description, body),
    )
    .unwrap();
}

/// Unrelated rules that give the corpus enough documents for IDF to mean something
pub fn write_filler_rules(home: &Path) {
    let fillers = [
        ("tabs", "Indent with four spaces; never mix tabs into source."),
        ("naming", "Functions read as verbs, types read as nouns."),
        ("commits", "Write imperative subjects under seventy characters."),
        ("secrets", "Credentials live in the vault, never inside repositories."),
        ("logging", "Emit structured events with stable field names."),
    ];
    for (name, text) in fillers {
        write_rule(home, name, text);
    }
}

pub fn request(summary: &str, tags: &[&str]) -> ObserveRequest {
    ObserveRequest {
        summary: summary.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}
