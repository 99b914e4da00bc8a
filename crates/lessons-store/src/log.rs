//! Append-only observation log backed by a JSONL file

use crate::io::{append_jsonl, atomic_write, read_lines};
use crate::types::Observation;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Selection applied when reading the log
#[derive(Debug, Default, Clone)]
pub struct ObservationFilter {
    /// Only records not yet consumed by a reflection
    pub unprocessed_only: bool,
    /// Case-insensitive substring over the searchable fields
    pub query: Option<String>,
    /// Keep only the N most recent matches (log order is chronological)
    pub most_recent: Option<usize>,
}

/// The observation log. Single writer; no locking.
#[derive(Debug, Clone)]
pub struct ObservationLog {
    path: PathBuf,
}

impl ObservationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, observation: &Observation) -> std::io::Result<()> {
        append_jsonl(&self.path, observation)
    }

    /// Every decodable record in log order; corrupt lines are skipped
    pub fn read_all(&self) -> std::io::Result<Vec<Observation>> {
        let lines = read_lines(&self.path)?;
        let mut records = Vec::with_capacity(lines.len());
        for (lineno, line) in lines.iter().enumerate() {
            match Observation::from_json_line(line) {
                Some(obs) => records.push(obs),
                None => tracing::debug!(line = lineno + 1, "skipping undecodable observation"),
            }
        }
        Ok(records)
    }

    pub fn read(&self, filter: &ObservationFilter) -> std::io::Result<Vec<Observation>> {
        Ok(apply_filter(self.read_all()?, filter))
    }

    /// The last `n` records regardless of processed state
    pub fn recent(&self, n: usize) -> std::io::Result<Vec<Observation>> {
        self.read(&ObservationFilter {
            most_recent: Some(n),
            ..Default::default()
        })
    }

    /// Flip `processed` to true for the given ids.
    ///
    /// Lines are rewritten through `serde_json::Value` so unknown fields and
    /// undecodable lines survive untouched. Returns how many records flipped.
    pub fn mark_processed(&self, ids: &HashSet<String>) -> std::io::Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let lines = read_lines(&self.path)?;
        let mut flipped = 0;
        let mut out = String::new();

        for line in lines {
            let rewritten = match serde_json::from_str::<serde_json::Value>(&line) {
                Ok(mut value) => {
                    let matches = value
                        .get("id")
                        .and_then(|v| v.as_str())
                        .map(|id| ids.contains(id))
                        .unwrap_or(false);
                    let already = value
                        .get("processed")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    if matches && !already {
                        if let Some(obj) = value.as_object_mut() {
                            obj.insert("processed".to_string(), serde_json::Value::Bool(true));
                            flipped += 1;
                        }
                        serde_json::to_string(&value)?
                    } else {
                        line
                    }
                }
                Err(_) => line,
            };
            out.push_str(&rewritten);
            out.push('\n');
        }

        if flipped > 0 {
            atomic_write(&self.path, out.as_bytes())?;
        }
        tracing::debug!(requested = ids.len(), flipped, "marked observations processed");
        Ok(flipped)
    }
}

fn apply_filter(records: Vec<Observation>, filter: &ObservationFilter) -> Vec<Observation> {
    let needle = filter
        .query
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(|q| q.to_lowercase());

    let mut selected: Vec<Observation> = records
        .into_iter()
        .filter(|o| !filter.unprocessed_only || !o.processed)
        .filter(|o| needle.as_deref().map_or(true, |n| matches_query(o, n)))
        .collect();

    if let Some(n) = filter.most_recent {
        let skip = selected.len().saturating_sub(n);
        selected.drain(..skip);
    }
    selected
}

/// `needle` must already be lowercased
fn matches_query(obs: &Observation, needle: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(needle);

    contains(&obs.summary)
        || obs.tags.iter().any(|t| contains(t))
        || contains(&obs.recommendation)
        || obs
            .context
            .as_ref()
            .and_then(|c| c.error.as_deref())
            .is_some_and(contains)
        || contains(obs.source.as_str())
        || obs.session_ref.as_deref().is_some_and(contains)
}
