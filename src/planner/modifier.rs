//! Aggregation modifier detection ("the most", "lowest", "en fazla", ...).
//!
//! A MAX/MIN modifier turns a grouped aggregate into a top-1 query. It is
//! looked up in three places, first match wins:
//!
//! 1. an explicit `aggregation_modifier` on the entities
//! 2. the raw entity list (`INTENT_MAX` / `INTENT_MIN` labels, or phrases in the text)
//! 3. the intent's own label

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{Entities, RawEntity};
use crate::sql::query::SortDir;

const MAX_LABEL: &str = "INTENT_MAX";
const MIN_LABEL: &str = "INTENT_MIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationModifier {
    Max,
    Min,
}

impl AggregationModifier {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAX" => Some(AggregationModifier::Max),
            "MIN" => Some(AggregationModifier::Min),
            _ => None,
        }
    }

    /// MAX sorts descending, MIN ascending.
    pub fn direction(self) -> SortDir {
        match self {
            AggregationModifier::Max => SortDir::Desc,
            AggregationModifier::Min => SortDir::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationModifier::Max => "MAX",
            AggregationModifier::Min => "MIN",
        }
    }
}

impl fmt::Display for AggregationModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural-language phrases that signal a modifier. Matched case-insensitively
/// as whole words. The English defaults carry their article so threshold
/// wording ("at least", "at most") does not read as a modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierPhrases {
    pub max_phrases: Vec<String>,
    pub min_phrases: Vec<String>,
}

impl Default for ModifierPhrases {
    fn default() -> Self {
        Self {
            max_phrases: ["en fazla", "en çok", "the most", "highest"]
                .map(String::from)
                .to_vec(),
            min_phrases: ["en az", "en düşük", "the least", "lowest"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ModifierPhrases {
    /// Modifier named by a phrase in `text`, MAX phrases checked first.
    pub fn match_text(&self, text: &str) -> Option<AggregationModifier> {
        let contains_any = |phrases: &[String]| phrases.iter().any(|p| phrase_matches(p, text));

        if contains_any(&self.max_phrases) {
            Some(AggregationModifier::Max)
        } else if contains_any(&self.min_phrases) {
            Some(AggregationModifier::Min)
        } else {
            None
        }
    }

    fn match_entity(&self, entity: &RawEntity) -> Option<AggregationModifier> {
        let label = entity.label.to_ascii_uppercase();
        if label.contains(MAX_LABEL) {
            return Some(AggregationModifier::Max);
        }
        if label.contains(MIN_LABEL) {
            return Some(AggregationModifier::Min);
        }
        self.match_text(&entity.text)
    }
}

/// Whether `phrase` occurs in `text` on word boundaries.
fn phrase_matches(phrase: &str, text: &str) -> bool {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return false;
    }
    let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(phrase, error = %e, "unusable modifier phrase");
            false
        }
    }
}

/// Find the aggregation modifier of a request, if any.
pub fn detect_modifier(
    entities: &Entities,
    intent_label: Option<&str>,
    phrases: &ModifierPhrases,
) -> Option<AggregationModifier> {
    if let Some(explicit) = entities
        .aggregation_modifier
        .as_deref()
        .and_then(AggregationModifier::parse)
    {
        debug!(modifier = %explicit, source = "explicit", "aggregation modifier");
        return Some(explicit);
    }

    if let Some(found) = entities.entities.iter().find_map(|e| phrases.match_entity(e)) {
        debug!(modifier = %found, source = "entities", "aggregation modifier");
        return Some(found);
    }

    let found = intent_label.and_then(|label| phrases.match_text(label));
    if let Some(found) = found {
        debug!(modifier = %found, source = "intent_label", "aggregation modifier");
    }
    found
}
