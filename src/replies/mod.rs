//! Reply generation for the three modes.
//!
//! - [`GenerationMode::Single`]: one reply with an analysis
//! - [`GenerationMode::Multiple`]: three stylistic variations
//! - [`GenerationMode::Compare`]: three strategies compared with a winner
//!
//! [`generate_reply`] turns a [`GenerationRequest`] into a prompt, performs
//! exactly one gateway call and parses the output into a typed [`ReplyResult`].

mod types;

pub use types::*;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::gateway::ModelGateway;
use crate::prompts::{build_comparison_prompt, build_single_prompt, build_variations_prompt};
use crate::strategy::Strategy;

/// Minutes credited for a single reply or a set of variations.
pub const MINUTES_PER_DRAFT: u64 = 5;
/// Minutes credited for a strategy comparison.
pub const MINUTES_PER_COMPARISON: u64 = 10;

/// Generation workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// One reply with analysis.
    #[default]
    Single,
    /// Three variations of a reply.
    Multiple,
    /// Three strategies compared.
    Compare,
}

impl GenerationMode {
    /// All modes in display order.
    pub const ALL: [GenerationMode; 3] = [
        GenerationMode::Single,
        GenerationMode::Multiple,
        GenerationMode::Compare,
    ];

    /// Whether a strategy must be selected before generating.
    pub fn requires_strategy(&self) -> bool {
        !matches!(self, GenerationMode::Compare)
    }

    /// Heading used when rendering this mode.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationMode::Single => "Single Response",
            GenerationMode::Multiple => "Multiple Variations",
            GenerationMode::Compare => "Compare Strategies",
        }
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Single => write!(f, "single"),
            GenerationMode::Multiple => write!(f, "multiple"),
            GenerationMode::Compare => write!(f, "compare"),
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(GenerationMode::Single),
            "multiple" | "variations" => Ok(GenerationMode::Multiple),
            "compare" | "comparison" => Ok(GenerationMode::Compare),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

/// Inputs for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The incoming message being replied to.
    pub message: String,
    /// Context and goal for the reply.
    pub context: String,
    /// Workflow to run.
    pub mode: GenerationMode,
    /// Selected strategy; only optional in compare mode.
    pub strategy: Option<Strategy>,
}

/// Usage credited for a successful generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsCredit {
    /// Replies produced.
    pub responses: u64,
    /// Minutes saved.
    pub minutes: u64,
}

impl GenerationRequest {
    /// Create a request.
    pub fn new(
        message: impl Into<String>,
        context: impl Into<String>,
        mode: GenerationMode,
        strategy: Option<Strategy>,
    ) -> Self {
        Self {
            message: message.into(),
            context: context.into(),
            mode,
            strategy,
        }
    }

    /// Check the preconditions for a generation.
    ///
    /// Both text fields must be non-blank, and a strategy must be selected
    /// unless the mode is compare.
    pub fn validate(&self) -> AppResult<()> {
        if self.message.trim().is_empty() || self.context.trim().is_empty() {
            return Err(AppError::validation(
                "Please fill in both message and context",
            ));
        }
        if self.strategy.is_none() && self.mode.requires_strategy() {
            return Err(AppError::validation("Please select a strategy"));
        }
        Ok(())
    }
}

impl ReplyResult {
    /// Usage credit for this result.
    pub fn stats_credit(&self) -> StatsCredit {
        let minutes = match self {
            ReplyResult::Comparison(_) => MINUTES_PER_COMPARISON,
            _ => MINUTES_PER_DRAFT,
        };
        StatsCredit {
            responses: self.reply_count() as u64,
            minutes,
        }
    }
}

/// Validate `request`, call the gateway once and parse the output.
pub async fn generate_reply(
    gateway: &dyn ModelGateway,
    request: &GenerationRequest,
) -> AppResult<ReplyResult> {
    request.validate()?;
    let start = Instant::now();

    let prompt = match (request.mode, request.strategy) {
        (GenerationMode::Single, Some(strategy)) => {
            build_single_prompt(&request.message, &request.context, strategy)
        }
        (GenerationMode::Multiple, Some(strategy)) => {
            build_variations_prompt(&request.message, &request.context, strategy)
        }
        (GenerationMode::Compare, _) => build_comparison_prompt(&request.message, &request.context),
        (_, None) => return Err(AppError::validation("Please select a strategy")),
    };

    debug!(
        mode = %request.mode,
        strategy = ?request.strategy,
        prompt_chars = prompt.text.len(),
        "Requesting generation"
    );

    let value = gateway.invoke(&prompt).await?;
    let result = parse_reply(request.mode, value).map_err(|e| {
        warn!(mode = %request.mode, error = %e, "Model output failed validation");
        AppError::from(e)
    })?;

    info!(
        mode = %request.mode,
        replies = result.reply_count(),
        latency_ms = start.elapsed().as_millis(),
        "Generation completed"
    );

    Ok(result)
}
