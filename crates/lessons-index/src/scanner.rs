//! Discovery of existing configuration artifacts (rules, hooks, skills)

use crate::tokenize::keywords;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::DirEntry;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Fixed manifest file name inside each skill directory
pub const SKILL_MANIFEST: &str = "SKILL.md";

static DESCRIPTION_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Rule,
    Hook,
    Skill,
}

/// One discovered artifact with its keyword set
#[derive(Debug, Clone)]
pub struct ExistingArtifact {
    pub kind: ArtifactKind,
    pub name: String,
    pub path: PathBuf,
    /// Skill manifests only
    pub description: Option<String>,
    pub keywords: HashSet<String>,
}

impl ExistingArtifact {
    pub fn from_text(
        kind: ArtifactKind,
        name: &str,
        path: impl Into<PathBuf>,
        text: &str,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            path: path.into(),
            description: None,
            keywords: keywords(text),
        }
    }
}

/// Anything that can hand over the current artifact corpus.
///
/// Discovery is best-effort: implementations return what they could read
/// and never fail.
pub trait ArtifactSource {
    fn artifacts(&self) -> Vec<ExistingArtifact>;
}

impl ArtifactSource for Vec<ExistingArtifact> {
    fn artifacts(&self) -> Vec<ExistingArtifact> {
        self.clone()
    }
}

/// Filesystem-backed source over the three artifact directories
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub rules_dir: PathBuf,
    pub hooks_dir: PathBuf,
    pub skills_dir: PathBuf,
}

impl DirectorySource {
    pub fn new(
        rules_dir: impl Into<PathBuf>,
        hooks_dir: impl Into<PathBuf>,
        skills_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rules_dir: rules_dir.into(),
            hooks_dir: hooks_dir.into(),
            skills_dir: skills_dir.into(),
        }
    }

    fn scan_files(dir: &Path, kind: ArtifactKind) -> Vec<ExistingArtifact> {
        let mut found = Vec::new();
        for entry in visible_entries(dir) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(text) = read_lossy(&path) else {
                continue;
            };
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            found.push(ExistingArtifact::from_text(kind, &name, path, &text));
        }
        found
    }

    fn scan_skills(dir: &Path) -> Vec<ExistingArtifact> {
        let mut found = Vec::new();
        for entry in visible_entries(dir) {
            let skill_dir = entry.path();
            if !skill_dir.is_dir() {
                continue;
            }
            let manifest = skill_dir.join(SKILL_MANIFEST);
            if !manifest.is_file() {
                continue;
            }
            let Some(text) = read_lossy(&manifest) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let mut artifact =
                ExistingArtifact::from_text(ArtifactKind::Skill, &name, manifest, &text);
            artifact.description = extract_description(&text);
            found.push(artifact);
        }
        found
    }
}

impl ArtifactSource for DirectorySource {
    fn artifacts(&self) -> Vec<ExistingArtifact> {
        let mut all = Self::scan_files(&self.rules_dir, ArtifactKind::Rule);
        all.extend(Self::scan_files(&self.hooks_dir, ArtifactKind::Hook));
        all.extend(Self::scan_skills(&self.skills_dir));
        tracing::debug!(count = all.len(), "discovered artifacts");
        all
    }
}

/// File contents with invalid UTF-8 replaced; `None` when unreadable
fn read_lossy(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable artifact");
            None
        }
    }
}

/// Non-hidden entries sorted by name; an unreadable directory is empty
fn visible_entries(dir: &Path) -> Vec<DirEntry> {
    let reader = match std::fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "artifact directory unavailable");
            return Vec::new();
        }
    };
    let mut entries: Vec<DirEntry> = reader
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    entries.sort_by_key(|e| e.file_name());
    entries
}

/// `description:` line of a manifest front-matter, quotes trimmed
pub fn extract_description(text: &str) -> Option<String> {
    let re =
        DESCRIPTION_RE.get_or_init(|| Regex::new(r"(?m)^description:[ \t]*(.+?)[ \t\r]*$").unwrap());
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|d| !d.is_empty())
}
