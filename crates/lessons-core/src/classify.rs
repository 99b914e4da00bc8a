//! Auto-classification of observations into artifact types

use lessons_store::{ArtifactType, ObservationContext};

struct TypeKeywords {
    artifact_type: ArtifactType,
    keywords: &'static [&'static str],
}

/// Checked in order; first vocabulary with any hit wins
const TYPE_KEYWORD_MAP: &[TypeKeywords] = &[
    TypeKeywords {
        artifact_type: ArtifactType::Hook,
        keywords: &[
            "hook",
            "automat",
            "trigger",
            "pre-tool",
            "post-tool",
            "pretool",
            "posttool",
            "pre-commit",
            "on-save",
        ],
    },
    TypeKeywords {
        artifact_type: ArtifactType::Agent,
        keywords: &["agent", "review", "audit", "oversight", "supervis"],
    },
];

/// Derive an artifact type from tags and context.
///
/// Automation vocabulary → hook, oversight vocabulary → agent, a full
/// before/after pair → skill, otherwise rule.
pub fn classify(tags: &[String], context: Option<&ObservationContext>) -> ArtifactType {
    let tag_text = tags.join(" ").to_lowercase();

    for entry in TYPE_KEYWORD_MAP {
        if entry.keywords.iter().any(|kw| tag_text.contains(kw)) {
            return entry.artifact_type;
        }
    }

    match context {
        Some(ctx) if ctx.before().is_some() && ctx.after().is_some() => ArtifactType::Skill,
        _ => ArtifactType::Rule,
    }
}

/// Remediation text when the caller supplied none
pub fn default_recommendation(summary: &str, context: Option<&ObservationContext>) -> String {
    if let Some(after) = context.and_then(|c| c.after()) {
        return format!("Next time: {}", after.trim());
    }
    if let Some(error) = context.and_then(|c| c.error()) {
        return format!("Avoid: {}", error.trim());
    }
    format!("Address: {}", summary.trim())
}
