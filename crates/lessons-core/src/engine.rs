//! The observe and reflect operations

use crate::classify::{classify, default_recommendation};
use crate::cluster::{cluster, ObservationGroup};
use crate::config::Config;
use crate::dedup::{fingerprint, is_duplicate};
use crate::error::{LessonsError, Result};
use crate::types::{
    Action, GroupReport, MemberSummary, ObserveOutcome, ObserveRequest, RecentEntry,
    ReflectOutcome, ReflectRequest, StatsView, Target,
};
use chrono::Utc;
use lessons_index::{score_artifacts, ArtifactSource, CorpusIndex, ExistingArtifact};
use lessons_store::{generate_id, Observation, ObservationFilter, ObservationLog};
use std::collections::{BTreeMap, HashSet};

/// Fixed advice returned with every cluster result
pub const GUIDANCE: &[&str] = &[
    "Prefer updating an existing artifact over creating a new one.",
    "Consolidate overlapping rules, hooks and skills instead of adding near-copies.",
    "Generalize from the specific incident to the underlying pattern.",
];

const NEEDS_BOTH_MESSAGE: &str =
    "correction context needs both `before` and `after`; record what finally worked";

/// Observation log plus artifact corpus, driven by one configuration
pub struct Engine<S: ArtifactSource> {
    log: ObservationLog,
    source: S,
    config: Config,
}

impl<S: ArtifactSource> Engine<S> {
    pub fn new(log: ObservationLog, source: S, config: Config) -> Self {
        Self {
            log,
            source,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    /// Validate, gate, deduplicate, classify and append one observation.
    ///
    /// `session` is supplied by the caller; the engine never reads it from
    /// the environment.
    pub fn observe(&self, request: ObserveRequest, session: &str) -> Result<ObserveOutcome> {
        let summary = request.summary.trim().to_string();
        let len = summary.chars().count();
        if len < self.config.min_summary_len {
            return Err(LessonsError::SummaryTooShort {
                len,
                min: self.config.min_summary_len,
            });
        }

        // gate before hashing; a present but blank `before` still counts
        if let Some(ctx) = &request.context {
            if is_set(&ctx.before) && !is_set(&ctx.after) {
                tracing::info!("observation skipped: correction without outcome");
                return Ok(ObserveOutcome::NeedsBoth {
                    message: NEEDS_BOTH_MESSAGE.to_string(),
                });
            }
        }

        let fp = fingerprint(&summary);
        let window = self.log.recent(self.config.dedup_window)?;
        if is_duplicate(&fp, &window) {
            tracing::info!(fingerprint = %fp, "observation skipped: duplicate");
            return Ok(ObserveOutcome::Duplicate { fingerprint: fp });
        }

        let context = request.context.filter(|c| *c != Default::default());
        let artifact_type = request
            .artifact_type
            .unwrap_or_else(|| classify(&request.tags, context.as_ref()));
        let recommendation = request
            .recommendation
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| default_recommendation(&summary, context.as_ref()));

        let observation = Observation {
            id: generate_id(),
            timestamp: Utc::now(),
            session: session.to_string(),
            summary,
            context,
            tags: request.tags,
            recommendation,
            artifact_type,
            source: request.source.unwrap_or_default(),
            session_ref: request.session_ref,
            processed: false,
        };
        self.log.append(&observation)?;

        let all = self.log.read_all()?;
        let unprocessed = all.iter().filter(|o| !o.processed).count();
        tracing::info!(
            id = %observation.id,
            artifact_type = %observation.artifact_type,
            unprocessed,
            total = all.len(),
            "observation recorded"
        );

        Ok(ObserveOutcome::Recorded {
            id: observation.id,
            recommendation: observation.recommendation,
            artifact_type: observation.artifact_type,
            unprocessed,
            total: all.len(),
        })
    }

    /// Query, stats or cluster pass depending on the request and backlog
    pub fn reflect(&self, request: &ReflectRequest) -> Result<ReflectOutcome> {
        let limit = request
            .limit
            .unwrap_or(self.config.default_limit)
            .max(1);

        // only the empty string means "no query"
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            return self.search(query, limit);
        }

        let all = self.log.read_all()?;
        let unprocessed = all.iter().filter(|o| !o.processed).count();
        if unprocessed == 0 {
            return Ok(ReflectOutcome::Stats(self.stats_from(&all)));
        }

        self.cluster_pass(limit)
    }

    /// Statistics over the whole log; never mutates
    pub fn stats(&self) -> Result<StatsView> {
        Ok(self.stats_from(&self.log.read_all()?))
    }

    fn search(&self, query: &str, limit: usize) -> Result<ReflectOutcome> {
        let mut matches = self.log.read(&ObservationFilter {
            query: Some(query.to_string()),
            ..Default::default()
        })?;
        let total_matches = matches.len();
        matches.reverse();
        matches.truncate(limit);

        Ok(ReflectOutcome::Query {
            query: query.to_string(),
            total_matches,
            observations: matches,
        })
    }

    fn stats_from(&self, all: &[Observation]) -> StatsView {
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for obs in all {
            *by_type.entry(obs.artifact_type.to_string()).or_insert(0) += 1;
        }
        let processed = all.iter().filter(|o| o.processed).count();

        StatsView {
            total: all.len(),
            processed,
            unprocessed: all.len() - processed,
            by_type,
            recent: all
                .iter()
                .rev()
                .take(self.config.recent_count)
                .map(RecentEntry::from)
                .collect(),
        }
    }

    fn cluster_pass(&self, limit: usize) -> Result<ReflectOutcome> {
        let batch = self.log.read(&ObservationFilter {
            unprocessed_only: true,
            most_recent: Some(limit),
            ..Default::default()
        })?;

        let groups = cluster(&batch, self.config.jaccard_threshold);

        let artifacts = self.source.artifacts();
        let index = CorpusIndex::build_with_ratio(&artifacts, self.config.generic_ratio);
        tracing::debug!(
            artifacts = index.total,
            vocabulary = index.vocabulary_size(),
            threshold = index.threshold,
            "corpus index built"
        );

        let reports: Vec<GroupReport> = groups
            .iter()
            .map(|g| self.report(g, &artifacts, &index))
            .collect();

        // every considered record is consumed, matched or not
        let ids: HashSet<String> = groups
            .iter()
            .flat_map(|g| g.ids())
            .map(String::from)
            .collect();
        let flipped = self.log.mark_processed(&ids)?;

        let updates = reports.iter().filter(|r| r.action == Action::Update).count();
        tracing::info!(
            considered = batch.len(),
            groups = reports.len(),
            updates,
            flipped,
            "reflection complete"
        );

        Ok(ReflectOutcome::Clusters {
            considered: batch.len(),
            groups: reports,
            guidance: GUIDANCE.iter().map(|g| g.to_string()).collect(),
        })
    }

    fn report(
        &self,
        group: &ObservationGroup,
        artifacts: &[ExistingArtifact],
        index: &CorpusIndex,
    ) -> GroupReport {
        let hits = score_artifacts(
            &group.tags,
            &group.word_set(),
            artifacts,
            index,
            &self.config.match_params(),
        );

        let targets: Vec<Target> = hits
            .into_iter()
            .map(|hit| Target {
                kind: hit.artifact.kind,
                name: hit.artifact.name,
                location: hit.artifact.path.display().to_string(),
                score: hit.score,
                description: hit.artifact.description,
            })
            .collect();

        GroupReport {
            name: group.name.clone(),
            artifact_type: group.artifact_type,
            tags: group.tags.clone(),
            size: group.size(),
            action: if targets.is_empty() {
                Action::Create
            } else {
                Action::Update
            },
            targets,
            observations: group
                .observations
                .iter()
                .map(|o| MemberSummary {
                    id: o.id.clone(),
                    summary: o.summary.clone(),
                    recommendation: o.recommendation.clone(),
                })
                .collect(),
        }
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_index::ArtifactKind;
    use lessons_store::{ArtifactType, ObservationContext};

    type TestEngine = Engine<Vec<ExistingArtifact>>;

    fn engine(artifacts: Vec<ExistingArtifact>) -> (tempfile::TempDir, TestEngine) {
        let temp = tempfile::TempDir::new().unwrap();
        let log = ObservationLog::new(temp.path().join("observations.jsonl"));
        (temp, Engine::new(log, artifacts, Config::new()))
    }

    fn request(summary: &str, tags: &[&str]) -> ObserveRequest {
        ObserveRequest {
            summary: summary.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_summary_rejected_without_write() {
        let (_temp, engine) = engine(vec![]);
        let err = engine.observe(request("too short", &[]), "s").unwrap_err();
        assert!(matches!(err, LessonsError::SummaryTooShort { len: 9, min: 20 }));
        assert!(!engine.log().path().exists());
    }

    #[test]
    fn test_needs_both_precedes_dedup() {
        let (_temp, engine) = engine(vec![]);
        let mut req = request("Renaming files broke the git history", &["git"]);
        req.context = Some(ObservationContext {
            before: Some("mv a b".to_string()),
            ..Default::default()
        });

        let outcome = engine.observe(req.clone(), "s").unwrap();
        assert!(matches!(outcome, ObserveOutcome::NeedsBoth { .. }));
        assert!(engine.log().read_all().unwrap().is_empty());

        // completing the pair records it; the rejected attempt left no fingerprint
        req.context.as_mut().unwrap().after = Some("git mv a b".to_string());
        let outcome = engine.observe(req, "s").unwrap();
        match outcome {
            ObserveOutcome::Recorded {
                artifact_type,
                recommendation,
                ..
            } => {
                assert_eq!(artifact_type, ArtifactType::Skill);
                assert_eq!(recommendation, "Next time: git mv a b");
            }
            other => panic!("expected Recorded, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_before_without_after_is_gated() {
        let (_temp, engine) = engine(vec![]);
        let mut req = request("Whitespace-only before still marks a correction", &[]);
        req.context = Some(ObservationContext {
            before: Some("   ".to_string()),
            ..Default::default()
        });

        let outcome = engine.observe(req.clone(), "s").unwrap();
        assert!(matches!(outcome, ObserveOutcome::NeedsBoth { .. }));
        assert!(engine.log().read_all().unwrap().is_empty());

        req.context.as_mut().unwrap().after = Some("  ".to_string());
        let outcome = engine.observe(req, "s").unwrap();
        assert!(matches!(outcome, ObserveOutcome::Recorded { .. }));
    }

    #[test]
    fn test_duplicate_then_backlog_counts() {
        let (_temp, engine) = engine(vec![]);
        let first = engine
            .observe(request("Always run the formatter before commit", &[]), "s")
            .unwrap();
        assert!(matches!(
            first,
            ObserveOutcome::Recorded {
                unprocessed: 1,
                total: 1,
                ..
            }
        ));

        let again = engine
            .observe(request("  ALWAYS run the formatter before commit ", &[]), "s")
            .unwrap();
        assert_eq!(
            again,
            ObserveOutcome::Duplicate {
                fingerprint: fingerprint("always run the formatter before commit")
            }
        );
        assert_eq!(engine.log().read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_explicit_fields_win_over_classification() {
        let (_temp, engine) = engine(vec![]);
        let mut req = request("Hook tags but the caller knows better", &["hook"]);
        req.artifact_type = Some(ArtifactType::Agent);
        req.recommendation = Some("Spawn a reviewer".to_string());
        engine.observe(req, "sess-9").unwrap();

        let stored = &engine.log().read_all().unwrap()[0];
        assert_eq!(stored.artifact_type, ArtifactType::Agent);
        assert_eq!(stored.recommendation, "Spawn a reviewer");
        assert_eq!(stored.session, "sess-9");
        assert!(stored.context.is_none());
    }

    #[test]
    fn test_reflect_stats_when_nothing_pending() {
        let (_temp, engine) = engine(vec![]);
        let outcome = engine.reflect(&ReflectRequest::default()).unwrap();
        match outcome {
            ReflectOutcome::Stats(stats) => {
                assert_eq!(stats.total, 0);
                assert_eq!(stats.unprocessed, 0);
            }
            other => panic!("expected stats, got {:?}", other),
        }
    }

    #[test]
    fn test_reflect_consumes_batch_and_then_reports_stats() {
        let artifacts = vec![ExistingArtifact::from_text(
            ArtifactKind::Rule,
            "unrelated",
            "/r/unrelated.md",
            "nothing relevant",
        )];
        let (_temp, engine) = engine(artifacts);
        engine
            .observe(request("Renamed a module without git mv", &["git", "rename"]), "s")
            .unwrap();
        engine
            .observe(request("Lost blame history after moving files", &["git", "history"]), "s")
            .unwrap();

        let outcome = engine.reflect(&ReflectRequest::default()).unwrap();
        let ReflectOutcome::Clusters {
            considered,
            groups,
            guidance,
        } = outcome
        else {
            panic!("expected clusters");
        };
        assert_eq!(considered, 2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].action, Action::Create);
        assert_eq!(groups[0].size, 2);
        assert_eq!(guidance.len(), GUIDANCE.len());

        assert!(engine.log().read_all().unwrap().iter().all(|o| o.processed));
        assert!(matches!(
            engine.reflect(&ReflectRequest::default()).unwrap(),
            ReflectOutcome::Stats(StatsView { processed: 2, unprocessed: 0, .. })
        ));
    }

    #[test]
    fn test_reflect_limit_takes_most_recent() {
        let (_temp, engine) = engine(vec![]);
        for i in 0..4 {
            engine
                .observe(request(&format!("distinct observation number {i}"), &[]), "s")
                .unwrap();
        }

        let outcome = engine
            .reflect(&ReflectRequest {
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(outcome, ReflectOutcome::Clusters { considered: 2, .. }));

        let all = engine.log().read_all().unwrap();
        let flags: Vec<bool> = all.iter().map(|o| o.processed).collect();
        assert_eq!(flags, [false, false, true, true]);
    }

    #[test]
    fn test_whitespace_query_searches_without_mutating() {
        let (_temp, engine) = engine(vec![]);
        engine
            .observe(request("Prefer small commits over one large one", &["git"]), "s")
            .unwrap();

        let outcome = engine
            .reflect(&ReflectRequest {
                query: Some("  ".to_string()),
                limit: None,
            })
            .unwrap();
        match outcome {
            ReflectOutcome::Query {
                query,
                total_matches,
                ..
            } => {
                assert_eq!(query, "  ");
                assert_eq!(total_matches, 0);
            }
            other => panic!("expected query results, got {:?}", other),
        }
        assert!(engine.log().read_all().unwrap().iter().all(|o| !o.processed));

        // the empty string is the only "no query"
        let outcome = engine
            .reflect(&ReflectRequest {
                query: Some(String::new()),
                limit: None,
            })
            .unwrap();
        assert!(matches!(outcome, ReflectOutcome::Clusters { considered: 1, .. }));
    }

    #[test]
    fn test_query_never_mutates() {
        let (_temp, engine) = engine(vec![]);
        engine
            .observe(request("Docker layer cache invalidated by COPY", &["docker"]), "s")
            .unwrap();
        engine
            .observe(request("Second docker lesson about build args", &["docker"]), "s")
            .unwrap();
        engine
            .observe(request("Unrelated shell quoting observation", &["bash"]), "s")
            .unwrap();

        let outcome = engine
            .reflect(&ReflectRequest {
                query: Some("DOCKER".to_string()),
                limit: Some(1),
            })
            .unwrap();
        match outcome {
            ReflectOutcome::Query {
                total_matches,
                observations,
                ..
            } => {
                assert_eq!(total_matches, 2);
                assert_eq!(observations.len(), 1);
                assert!(observations[0].summary.starts_with("Second"));
            }
            other => panic!("expected query results, got {:?}", other),
        }
        assert!(engine.log().read_all().unwrap().iter().all(|o| !o.processed));
    }
}
