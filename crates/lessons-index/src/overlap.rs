//! IDF-weighted overlap between an observation group and existing artifacts

use crate::corpus::CorpusIndex;
use crate::scanner::ExistingArtifact;
use std::collections::HashSet;

const DEFAULT_MIN_SCORE: f64 = 3.0;
const DEFAULT_NAME_BONUS: f64 = 5.0;
const DEFAULT_MAX_TARGETS: usize = 2;

/// Decision constants for overlap matching.
///
/// 3.0 is reached by one name match alone, by three words unique to one
/// artifact, or by nine words each shared across three artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchParams {
    pub min_score: f64,
    pub name_bonus: f64,
    pub max_targets: usize,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            name_bonus: DEFAULT_NAME_BONUS,
            max_targets: DEFAULT_MAX_TARGETS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoredArtifact {
    pub artifact: ExistingArtifact,
    pub score: f64,
}

/// Score every artifact against a group's tags and word set.
///
/// Returns at most `max_targets` artifacts scoring at least `min_score`,
/// best first. Equal scores keep discovery order. Empty means "create".
pub fn score_artifacts(
    tags: &[String],
    words: &HashSet<String>,
    artifacts: &[ExistingArtifact],
    index: &CorpusIndex,
    params: &MatchParams,
) -> Vec<ScoredArtifact> {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut scored: Vec<ScoredArtifact> = artifacts
        .iter()
        .filter_map(|artifact| {
            let score = score_one(&tags, words, artifact, index, params.name_bonus);
            (score >= params.min_score).then(|| ScoredArtifact {
                artifact: artifact.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(params.max_targets);
    scored
}

fn score_one(
    tags: &[String],
    words: &HashSet<String>,
    artifact: &ExistingArtifact,
    index: &CorpusIndex,
    name_bonus: f64,
) -> f64 {
    let mut score: f64 = words
        .iter()
        .filter(|w| !index.is_generic(w) && artifact.keywords.contains(*w))
        .map(|w| index.weight(w))
        .sum();

    if name_matches(tags, &artifact.name) {
        score += name_bonus;
    }
    score
}

/// Any tag contained in the artifact name, or the name in a tag
fn name_matches(tags: &[String], name: &str) -> bool {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }
    tags.iter()
        .any(|tag| name.contains(tag.as_str()) || tag.contains(name.as_str()))
}
