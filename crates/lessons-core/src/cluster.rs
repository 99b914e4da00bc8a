//! Greedy tag-overlap clustering of observations.
//!
//! Groups are opened in input order and each observation joins the first
//! group whose founding tag set it overlaps by more than the threshold
//! (first-fit, not best-fit). Output therefore depends on input order but
//! is deterministic for a given order. A union-find over the full pairwise
//! similarity graph would remove the order sensitivity if that is ever
//! needed; at tens of observations per batch the greedy pass is enough.

use lessons_index::keywords;
use lessons_store::{ArtifactType, Observation};
use std::collections::{BTreeSet, HashSet};

const MAX_SLUG_LEN: usize = 25;

/// Related observations from one reflection pass; never persisted
#[derive(Debug, Clone)]
pub struct ObservationGroup {
    pub observations: Vec<Observation>,
    /// Union of member tags, normalized, in first-seen order
    pub tags: Vec<String>,
    /// Majority vote over members
    pub artifact_type: ArtifactType,
    pub name: String,
}

impl ObservationGroup {
    pub fn size(&self) -> usize {
        self.observations.len()
    }

    /// Tags plus every keyword of member summaries and recommendations
    pub fn word_set(&self) -> HashSet<String> {
        let mut words: HashSet<String> = self.tags.iter().cloned().collect();
        for obs in &self.observations {
            words.extend(keywords(&obs.summary));
            words.extend(keywords(&obs.recommendation));
        }
        words
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.observations.iter().map(|o| o.id.as_str())
    }
}

/// |a ∩ b| / |a ∪ b|; two empty sets score 0
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

struct OpenGroup {
    /// Founding member's tags; `None` for untagged singletons
    key: Option<BTreeSet<String>>,
    members: Vec<usize>,
}

/// Partition observations into groups, largest first
pub fn cluster(observations: &[Observation], threshold: f64) -> Vec<ObservationGroup> {
    let mut open: Vec<OpenGroup> = Vec::new();

    for (idx, obs) in observations.iter().enumerate() {
        let tag_set: BTreeSet<String> = normalize_tags(&obs.tags).into_iter().collect();

        if tag_set.is_empty() {
            open.push(OpenGroup {
                key: None,
                members: vec![idx],
            });
            continue;
        }

        let joined = open.iter_mut().find(|g| {
            g.key
                .as_ref()
                .is_some_and(|key| jaccard(&tag_set, key) > threshold)
        });

        match joined {
            Some(group) => group.members.push(idx),
            None => open.push(OpenGroup {
                key: Some(tag_set),
                members: vec![idx],
            }),
        }
    }

    let mut groups: Vec<ObservationGroup> = open
        .into_iter()
        .map(|g| finalize(g.members.iter().map(|&i| &observations[i])))
        .collect();

    // stable: equal sizes keep creation order
    groups.sort_by(|a, b| b.size().cmp(&a.size()));
    groups
}

fn finalize<'a>(members: impl Iterator<Item = &'a Observation>) -> ObservationGroup {
    let observations: Vec<Observation> = members.cloned().collect();

    let mut tags: Vec<String> = Vec::new();
    for obs in &observations {
        for tag in normalize_tags(&obs.tags) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    let artifact_type = majority_type(&observations);
    let name = group_name(&tags, &observations);

    ObservationGroup {
        observations,
        tags,
        artifact_type,
        name,
    }
}

/// Most frequent type; ties go to the type first encountered
fn majority_type(observations: &[Observation]) -> ArtifactType {
    let mut votes: Vec<(ArtifactType, usize)> = Vec::new();
    for obs in observations {
        match votes.iter_mut().find(|(t, _)| *t == obs.artifact_type) {
            Some((_, count)) => *count += 1,
            None => votes.push((obs.artifact_type, 1)),
        }
    }

    let mut best: Option<(ArtifactType, usize)> = None;
    for (t, count) in votes {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((t, count));
        }
    }
    best.map(|(t, _)| t).unwrap_or_default()
}

fn group_name(tags: &[String], observations: &[Observation]) -> String {
    let slug = slugify(&tags.iter().take(2).cloned().collect::<Vec<_>>().join("-"));
    if slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        return slug;
    }

    let suffix = observations
        .first()
        .map(|o| id_suffix(&o.id))
        .unwrap_or_default();
    format!("pattern-{}", suffix)
}

/// Lowercased and stripped to `[a-z0-9-]`, at most 25 characters
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(MAX_SLUG_LEN)
        .collect()
}

/// Random tail of a generated id, or the last few characters otherwise
fn id_suffix(id: &str) -> String {
    let tail = id.rsplit('_').next().unwrap_or(id);
    let slug = slugify(tail);
    let chars: Vec<char> = slug.chars().collect();
    chars[chars.len().saturating_sub(6)..].iter().collect()
}
