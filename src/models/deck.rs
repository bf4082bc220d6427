use serde::{Deserialize, Serialize};
use std::fmt;

use super::card::Card;

// ---------------------------------------------------------------------------
// BuildStage
// ---------------------------------------------------------------------------

/// Pipeline states for a single build request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    Generating,
    Validating,
    Replacing,
    Revalidating,
    Resolving,
    Assembling,
    Complete,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildStage::Generating => "generating",
            BuildStage::Validating => "validating",
            BuildStage::Replacing => "replacing",
            BuildStage::Revalidating => "re-validating",
            BuildStage::Resolving => "resolving",
            BuildStage::Assembling => "assembling",
            BuildStage::Complete => "complete",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// BuildNotice
// ---------------------------------------------------------------------------

/// Non-fatal conditions recorded while a build continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildNotice {
    /// A card name could not be resolved; its slot is backfilled.
    LookupGap { name: String },
    /// The model-assisted scan was unavailable; deterministic results were used.
    ValidationFallback { reason: String },
    /// A model-suggested replacement failed re-validation and was discarded.
    RejectedSuggestion { name: String, reason: String },
    /// A card was dropped during assembly after its resolved data failed a check.
    DroppedCard { name: String, reason: String },
    /// Slots were filled with basic lands.
    Padded { count: usize },
    /// The resolved deck costs more than the requested budget.
    OverBudget { total: f64, budget: f64 },
}

impl fmt::Display for BuildNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildNotice::LookupGap { name } => write!(f, "Could not find card data for {}", name),
            BuildNotice::ValidationFallback { reason } => {
                write!(f, "AI scan unavailable, using rules engine only: {}", reason)
            }
            BuildNotice::RejectedSuggestion { name, reason } => {
                write!(f, "Rejected suggested replacement {}: {}", name, reason)
            }
            BuildNotice::DroppedCard { name, reason } => write!(f, "Dropped {}: {}", name, reason),
            BuildNotice::Padded { count } => write!(f, "Added {} basic lands to reach 99 cards", count),
            BuildNotice::OverBudget { total, budget } => write!(
                f,
                "Estimated deck cost ${:.2} exceeds budget ${:.2}",
                total, budget
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// BuiltDeck
// ---------------------------------------------------------------------------

/// The single success shape of a build: 99 cards, the commander and a log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltDeck {
    pub cards: Vec<Card>,
    pub commander: Card,
    pub build_log: Vec<String>,
    #[serde(default)]
    pub notices: Vec<BuildNotice>,
}
