//! Authored hint rules.
//!
//! A case may ship an ordered list of hint rules beside its case file.
//! When a player uses an investigation tool, the first rule matching the
//! tool + query pair contributes its text to the reply, optionally wrapped
//! as a spoiler.

use serde::{Deserialize, Serialize};

/// One authored hint rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintRule {
    /// Tool this rule listens to (`dna`, `search`, `footage`, `logs`,
    /// `examine`).
    pub tool: String,
    #[serde(rename = "match")]
    pub matcher: HintMatcher,
    pub text: String,
    #[serde(default)]
    pub spoiler: bool,
}

/// How a rule matches the player's query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HintMatcher {
    /// Normalized query equals one of the listed values.
    Exact { values: Vec<String> },
    /// Normalized query contains the needle.
    Contains { needle: String },
    /// Query names this room, ignoring spacing and separators.
    Location { room: String },
}

/// Matches tool queries against a case's hint rules, first match wins.
#[derive(Debug, Default)]
pub struct HintEngine {
    rules: Vec<HintRule>,
}

impl HintEngine {
    pub fn new(rules: Vec<HintRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First matching rule's formatted text, or None.
    pub fn evaluate(&self, tool: &str, query: &str) -> Option<String> {
        let normalized = normalize(query);
        self.rules
            .iter()
            .filter(|rule| rule.tool == tool)
            .find(|rule| match &rule.matcher {
                HintMatcher::Exact { values } => values.iter().any(|v| normalize(v) == normalized),
                HintMatcher::Contains { needle } => normalized.contains(&normalize(needle)),
                HintMatcher::Location { room } => {
                    normalize_location(room) == normalize_location(query)
                }
            })
            .map(|rule| {
                if rule.spoiler {
                    format!("||{}||", rule.text)
                } else {
                    rule.text.clone()
                }
            })
    }
}

/// Lowercase and strip everything but alphanumerics and `:_.-`.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-'))
        .collect()
}

/// Location comparison also ignores separators, so "Main Deck" and
/// "main_deck" name the same room.
fn normalize_location(raw: &str) -> String {
    normalize(raw).replace(['_', '-', '.'], "")
}
