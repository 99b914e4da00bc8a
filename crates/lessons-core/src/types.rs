//! Request and result shapes of the observe / reflect operations

use chrono::{DateTime, Utc};
use lessons_index::ArtifactKind;
use lessons_store::{ArtifactType, Observation, ObservationContext, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input of the observe operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserveRequest {
    pub summary: String,
    #[serde(default)]
    pub context: Option<ObservationContext>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default, alias = "artifact_type")]
    pub artifact_type: Option<ArtifactType>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default, alias = "session_ref")]
    pub session_ref: Option<String>,
}

/// Result of observe. Only `Recorded` touches the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObserveOutcome {
    Recorded {
        id: String,
        recommendation: String,
        artifact_type: ArtifactType,
        unprocessed: usize,
        total: usize,
    },
    /// `context.before` without `context.after`
    NeedsBoth { message: String },
    Duplicate { fingerprint: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReflectOutcome {
    /// Search across processed and unprocessed records, most recent first
    Query {
        query: String,
        total_matches: usize,
        observations: Vec<Observation>,
    },
    /// Nothing waiting to be processed
    Stats(StatsView),
    Clusters {
        considered: usize,
        groups: Vec<GroupReport>,
        guidance: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsView {
    pub total: usize,
    pub processed: usize,
    pub unprocessed: usize,
    pub by_type: BTreeMap<String, usize>,
    pub recent: Vec<RecentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub artifact_type: ArtifactType,
    pub processed: bool,
    pub summary: String,
}

impl From<&Observation> for RecentEntry {
    fn from(obs: &Observation) -> Self {
        Self {
            id: obs.id.clone(),
            timestamp: obs.timestamp,
            artifact_type: obs.artifact_type,
            processed: obs.processed,
            summary: obs.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Update,
    Create,
}

/// An existing artifact the group should be folded into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub name: String,
    pub location: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: String,
    pub summary: String,
    pub recommendation: String,
}

/// One cluster annotated with its recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub artifact_type: ArtifactType,
    pub tags: Vec<String>,
    pub size: usize,
    pub action: Action,
    pub targets: Vec<Target>,
    pub observations: Vec<MemberSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_request_accepts_both_key_styles() {
        let camel: ObserveRequest = serde_json::from_str(
            r#"{"summary":"x","artifactType":"hook","sessionRef":"a.jsonl"}"#,
        )
        .unwrap();
        assert_eq!(camel.artifact_type, Some(ArtifactType::Hook));
        assert_eq!(camel.session_ref.as_deref(), Some("a.jsonl"));

        let snake: ObserveRequest =
            serde_json::from_str(r#"{"summary":"x","artifact_type":"agent","tags":["a"]}"#)
                .unwrap();
        assert_eq!(snake.artifact_type, Some(ArtifactType::Agent));
        assert_eq!(snake.tags, ["a"]);
    }

    #[test]
    fn test_observe_request_rejects_unknown_type() {
        let parsed =
            serde_json::from_str::<ObserveRequest>(r#"{"summary":"x","artifactType":"macro"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_outcome_tags() {
        let json = serde_json::to_value(ObserveOutcome::Duplicate {
            fingerprint: "deadbeef".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "duplicate");
        assert_eq!(json["fingerprint"], "deadbeef");

        let json = serde_json::to_value(ReflectOutcome::Stats(StatsView::default())).unwrap();
        assert_eq!(json["mode"], "stats");
        assert_eq!(json["unprocessed"], 0);
    }

    #[test]
    fn test_target_serializes_type_key() {
        let target = Target {
            kind: ArtifactKind::Skill,
            name: "release".to_string(),
            location: "/s/release/SKILL.md".to_string(),
            score: 5.0,
            description: None,
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "skill");
        assert!(json.get("description").is_none());
    }
}
