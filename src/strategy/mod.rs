//! Persuasion strategy catalog.
//!
//! The six strategies are fixed at compile time. Each carries a one-sentence
//! tactical instruction that is embedded in prompts, plus display metadata
//! used only when rendering.

mod templates;

pub use templates::Template;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A named persuasion tactic applied when drafting a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Pacing and leading toward agreement.
    CooperativeAlign,
    /// Framing and reciprocity.
    GentlePersuasion,
    /// Clear, firm language.
    AssertBoundaries,
    /// Empathy and shared identity.
    BuildRapport,
    /// Validation and reframing.
    DeescalateConflict,
    /// Direct and simple language.
    ProvideClarity,
}

/// Display metadata for a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDetails {
    /// Human-readable name.
    pub name: &'static str,
    /// Short description shown under the name.
    pub description: &'static str,
    /// Icon identifier.
    pub icon: &'static str,
}

impl Strategy {
    /// All strategies in declaration order.
    pub const ALL: [Strategy; 6] = [
        Strategy::CooperativeAlign,
        Strategy::GentlePersuasion,
        Strategy::AssertBoundaries,
        Strategy::BuildRapport,
        Strategy::DeescalateConflict,
        Strategy::ProvideClarity,
    ];

    /// All strategies in declaration order.
    pub fn all() -> &'static [Strategy] {
        &Self::ALL
    }

    /// Look up a strategy by its identifier.
    ///
    /// Matching is case-insensitive and accepts `-` in place of `_`.
    pub fn lookup(id: &str) -> Result<Strategy, AppError> {
        let normalized = id.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.id() == normalized)
            .ok_or_else(|| AppError::UnknownStrategy { id: id.to_string() })
    }

    /// Stable identifier, as used in prompts and persisted history.
    pub fn id(&self) -> &'static str {
        match self {
            Strategy::CooperativeAlign => "COOPERATIVE_ALIGN",
            Strategy::GentlePersuasion => "GENTLE_PERSUASION",
            Strategy::AssertBoundaries => "ASSERT_BOUNDARIES",
            Strategy::BuildRapport => "BUILD_RAPPORT",
            Strategy::DeescalateConflict => "DEESCALATE_CONFLICT",
            Strategy::ProvideClarity => "PROVIDE_CLARITY",
        }
    }

    /// Tactical instruction embedded in prompts.
    pub fn instruction(&self) -> &'static str {
        match self {
            Strategy::CooperativeAlign => "Use 'Pacing and Leading.' Match their language, acknowledge their reality, then lead to your outcome.",
            Strategy::GentlePersuasion => "Use 'Framing and Reciprocity.' Frame positively, offer a small concession to increase agreeability.",
            Strategy::AssertBoundaries => "Use 'Clear, Firm Language.' Be polite but direct. State your position without excessive apology.",
            Strategy::BuildRapport => "Use 'Empathy and Shared Identity.' Validate feelings, find common ground before making requests.",
            Strategy::DeescalateConflict => "Use 'Validation and Reframing.' Validate emotions, reframe from conflict to shared challenge.",
            Strategy::ProvideClarity => "Use 'Direct & Simple Language.' Avoid jargon. State facts, context, and next steps clearly.",
        }
    }

    /// Display metadata.
    pub fn details(&self) -> StrategyDetails {
        let (name, description, icon) = match self {
            Strategy::CooperativeAlign => (
                "Cooperate & Align",
                "Pacing & Leading for agreement",
                "handshake",
            ),
            Strategy::GentlePersuasion => {
                ("Gentle Persuasion", "Framing & Reciprocity", "arrow-right")
            }
            Strategy::AssertBoundaries => ("Assert Boundaries", "Clear, firm language", "shield"),
            Strategy::BuildRapport => ("Build Rapport", "Empathy & Connection", "heart"),
            Strategy::DeescalateConflict => (
                "De-escalate Conflict",
                "Validation & Reframing",
                "shield-check",
            ),
            Strategy::ProvideClarity => ("Provide Clarity", "Direct & Simple", "eye"),
        };
        StrategyDetails {
            name,
            description,
            icon,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Strategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::lookup(s)
    }
}
