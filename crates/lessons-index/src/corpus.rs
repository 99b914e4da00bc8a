//! Corpus-wide document frequency over discovered artifacts

use crate::scanner::ExistingArtifact;
use std::collections::HashMap;

/// Share of the corpus above which a keyword stops discriminating
pub const DEFAULT_GENERIC_RATIO: f64 = 0.4;

/// Keyword document frequencies plus the genericity cut-off.
///
/// Rebuilt from scratch on every reflection; never persisted.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    doc_freq: HashMap<String, usize>,
    pub threshold: f64,
    pub total: usize,
}

impl CorpusIndex {
    pub fn build(artifacts: &[ExistingArtifact]) -> Self {
        Self::build_with_ratio(artifacts, DEFAULT_GENERIC_RATIO)
    }

    pub fn build_with_ratio(artifacts: &[ExistingArtifact], generic_ratio: f64) -> Self {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        // keyword sets are already unique per artifact
        for artifact in artifacts {
            for word in &artifact.keywords {
                *doc_freq.entry(word.clone()).or_insert(0) += 1;
            }
        }

        let total = artifacts.len();
        Self {
            doc_freq,
            threshold: generic_ratio * total as f64,
            total,
        }
    }

    /// Number of artifacts containing `word`
    pub fn doc_freq(&self, word: &str) -> usize {
        self.doc_freq.get(word).copied().unwrap_or(0)
    }

    /// Appears in more than the threshold share of artifacts
    pub fn is_generic(&self, word: &str) -> bool {
        self.doc_freq(word) as f64 > self.threshold
    }

    /// IDF weight `1 / df`; zero for generic or unseen words
    pub fn weight(&self, word: &str) -> f64 {
        let df = self.doc_freq(word);
        if df == 0 || self.is_generic(word) {
            0.0
        } else {
            1.0 / df as f64
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.doc_freq.len()
    }
}
