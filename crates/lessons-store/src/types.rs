//! Observation record types and the default-on-read decode path

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel session identifier when the caller has none
pub const UNKNOWN_SESSION: &str = "unknown";

/// Kind of assistant configuration an observation should feed into
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    #[default]
    Rule,
    Skill,
    Hook,
    Agent,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Rule => "rule",
            ArtifactType::Skill => "skill",
            ArtifactType::Hook => "hook",
            ArtifactType::Agent => "agent",
        }
    }

    /// Lenient parse; `None` for anything outside the closed set
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rule" => Some(ArtifactType::Rule),
            "skill" => Some(ArtifactType::Skill),
            "hook" => Some(ArtifactType::Hook),
            "agent" => Some(ArtifactType::Agent),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an observation came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Manual,
    Hook,
    Conversation,
    Session,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Manual => "manual",
            Source::Hook => "hook",
            Source::Conversation => "conversation",
            Source::Session => "session",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Some(Source::Manual),
            "hook" => Some(Source::Hook),
            "conversation" => Some(Source::Conversation),
            "session" => Some(Source::Session),
            _ => None,
        }
    }
}

/// Structured context of a correction or failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ObservationContext {
    /// Present and not blank
    pub fn before(&self) -> Option<&str> {
        non_blank(self.before.as_deref())
    }

    pub fn after(&self) -> Option<&str> {
        non_blank(self.after.as_deref())
    }

    pub fn error(&self) -> Option<&str> {
        non_blank(self.error.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// A single remembered event, as stored in the observation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ObservationContext>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub artifact_type: ArtifactType,
    #[serde(default)]
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ref: Option<String>,
    #[serde(default)]
    pub processed: bool,
}

impl Observation {
    /// Decode one log line through the permissive representation
    pub fn from_json_line(line: &str) -> Option<Self> {
        let raw: RawObservation = serde_json::from_str(line).ok()?;
        raw.into_observation()
    }
}

/// Permissive on-disk shape: every field optional, enums as free strings.
///
/// Older records predate `recommendation`, `artifactType` and `source`; they
/// are backfilled here instead of failing the strict decode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObservation {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub session: Option<String>,
    pub summary: Option<String>,
    pub context: Option<ObservationContext>,
    pub tags: Option<Vec<String>>,
    pub recommendation: Option<String>,
    pub artifact_type: Option<String>,
    pub source: Option<String>,
    pub session_ref: Option<String>,
    pub processed: Option<bool>,
}

impl RawObservation {
    /// Apply defaults and validate into the strict record
    pub fn into_observation(self) -> Option<Observation> {
        let id = self.id.filter(|v| !v.trim().is_empty())?;
        let summary = self.summary.filter(|v| !v.trim().is_empty())?;

        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default();

        Some(Observation {
            id,
            timestamp,
            session: self
                .session
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SESSION.to_string()),
            summary,
            context: self.context,
            tags: self.tags.unwrap_or_default(),
            recommendation: self.recommendation.unwrap_or_default(),
            artifact_type: self
                .artifact_type
                .as_deref()
                .and_then(ArtifactType::parse)
                .unwrap_or_default(),
            source: self
                .source
                .as_deref()
                .and_then(Source::parse)
                .unwrap_or_default(),
            session_ref: self.session_ref,
            processed: self.processed.unwrap_or(false),
        })
    }
}

/// Generate an observation id: creation time plus a random suffix
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("obs_{:x}_{}", millis, suffix)
}
