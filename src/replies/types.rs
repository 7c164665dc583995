use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::GenerationMode;
use crate::error::ParseError;

/// Number of variations and compared strategies requested from the model.
pub const EXPECTED_ITEMS: usize = 3;

/// A single drafted reply with the rationale behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleResult {
    /// The drafted reply.
    pub reply: String,
    /// How the strategy was applied.
    pub analysis: String,
}

/// One stylistic variation of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    /// Short label, e.g. "Variation 1: More Formal".
    pub title: String,
    /// The drafted reply.
    pub reply: String,
}

/// Three variations of a reply under one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationsResult {
    /// Variations in the order the model returned them.
    pub variations: Vec<Variation>,
}

/// One strategy's entry in a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonItem {
    /// Strategy name as chosen by the model.
    pub strategy_name: String,
    /// The drafted reply.
    pub reply: String,
    /// Pros and cons of the strategy in this context.
    pub analysis: String,
}

/// Three strategies compared, with a recommended winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Compared strategies.
    pub comparison: Vec<ComparisonItem>,
    /// Name of the recommended strategy.
    pub best_strategy: String,
}

/// A typed generation result, tagged by the mode that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "result", rename_all = "snake_case")]
pub enum ReplyResult {
    /// Result of [`GenerationMode::Single`].
    Single(SingleResult),
    /// Result of [`GenerationMode::Multiple`].
    Variations(VariationsResult),
    /// Result of [`GenerationMode::Compare`].
    Comparison(ComparisonResult),
}

impl ComparisonResult {
    /// Whether `item` is the recommended strategy.
    ///
    /// The model names the winner loosely, so this is a case-insensitive
    /// substring match of the best strategy inside the item's name.
    pub fn is_best(&self, item: &ComparisonItem) -> bool {
        let best = self.best_strategy.trim().to_uppercase();
        !best.is_empty() && item.strategy_name.to_uppercase().contains(&best)
    }

    /// First item matching the recommended strategy.
    pub fn best(&self) -> Option<&ComparisonItem> {
        self.comparison.iter().find(|item| self.is_best(item))
    }
}

impl ReplyResult {
    /// Mode this result belongs to.
    pub fn mode(&self) -> GenerationMode {
        match self {
            ReplyResult::Single(_) => GenerationMode::Single,
            ReplyResult::Variations(_) => GenerationMode::Multiple,
            ReplyResult::Comparison(_) => GenerationMode::Compare,
        }
    }

    /// Number of replies this result contains.
    pub fn reply_count(&self) -> usize {
        match self {
            ReplyResult::Single(_) => 1,
            ReplyResult::Variations(v) => v.variations.len(),
            ReplyResult::Comparison(c) => c.comparison.len(),
        }
    }
}

/// Parse and validate model output for `mode`.
pub fn parse_reply(mode: GenerationMode, value: Value) -> Result<ReplyResult, ParseError> {
    match mode {
        GenerationMode::Single => decode::<SingleResult>(value).map(ReplyResult::Single),
        GenerationMode::Multiple => {
            let result = decode::<VariationsResult>(value)?;
            check_count("variations", result.variations.len())?;
            Ok(ReplyResult::Variations(result))
        }
        GenerationMode::Compare => {
            let result = decode::<ComparisonResult>(value)?;
            validate_comparison(&result)?;
            Ok(ReplyResult::Comparison(result))
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::Shape {
        message: e.to_string(),
    })
}

fn check_count(what: &str, actual: usize) -> Result<(), ParseError> {
    if actual != EXPECTED_ITEMS {
        return Err(ParseError::WrongCount {
            what: what.to_string(),
            expected: EXPECTED_ITEMS,
            actual,
        });
    }
    Ok(())
}

fn validate_comparison(result: &ComparisonResult) -> Result<(), ParseError> {
    check_count("compared strategies", result.comparison.len())?;

    let mut seen = HashSet::new();
    for item in &result.comparison {
        if !seen.insert(item.strategy_name.trim().to_uppercase()) {
            return Err(ParseError::DuplicateStrategy {
                name: item.strategy_name.clone(),
            });
        }
    }

    if result.best().is_none() {
        return Err(ParseError::UnknownBest {
            best: result.best_strategy.clone(),
        });
    }

    Ok(())
}
