//! Context carried from one round into the next.

use std::fmt;

use serde::Serialize;

use super::RoundResult;

const HEADER: &str = "=== COUNCIL DISCUSSION SUMMARY ===\n\n";

/// Serialized summary of a single round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregatedContext(String);

impl AggregatedContext {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AggregatedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a round as context for the next one
pub fn aggregate(round: &RoundResult) -> AggregatedContext {
    let mut text = String::from(HEADER);
    for opinion in round {
        text.push_str(&opinion.speaker);
        text.push_str(":\n");
        text.push_str(&opinion.text);
        text.push_str("\n\n");
    }
    AggregatedContext(text)
}
