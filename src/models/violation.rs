use serde::{Deserialize, Serialize};
use std::fmt;

use super::card::Color;

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    #[serde(alias = "banned", alias = "ban")]
    BannedCard,
    #[serde(alias = "color", alias = "colors", alias = "color_identity_violation")]
    ColorIdentity,
    #[serde(alias = "singleton", alias = "duplicate")]
    SingletonViolation,
    DeckSize,
    #[serde(alias = "commander")]
    InvalidCommander,
    LandCount,
}

impl ViolationType {
    /// Violations tied to a specific card slot that a replacement can fix.
    pub fn is_replaceable(self) -> bool {
        matches!(
            self,
            ViolationType::BannedCard
                | ViolationType::ColorIdentity
                | ViolationType::SingletonViolation
        )
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationType::BannedCard => "banned_card",
            ViolationType::ColorIdentity => "color_identity",
            ViolationType::SingletonViolation => "singleton_violation",
            ViolationType::DeckSize => "deck_size",
            ViolationType::InvalidCommander => "invalid_commander",
            ViolationType::LandCount => "land_count",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    #[serde(alias = "warning", alias = "medium")]
    Moderate,
    #[serde(alias = "info", alias = "low")]
    Minor,
}

/// A single rule infraction found by a validation pass.
///
/// Created fresh on every pass and consumed by the replacement stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub card: String,
    #[serde(rename = "type")]
    pub kind: ViolationType,
    pub severity: Severity,
    #[serde(default)]
    pub reason: String,
    pub suggested_replacement: Option<String>,
}

impl Violation {
    pub fn new(
        card: impl Into<String>,
        kind: ViolationType,
        severity: Severity,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            card: card.into(),
            kind,
            severity,
            reason: reason.into(),
            suggested_replacement: None,
        }
    }

    pub fn with_suggestion(mut self, name: impl Into<String>) -> Self {
        self.suggested_replacement = Some(name.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

// ---------------------------------------------------------------------------
// Check results
// ---------------------------------------------------------------------------

/// Outcome of the offline color identity check for a single card name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorIdentityCheck {
    pub is_valid: bool,
    pub reason: Option<String>,
    pub card_color_identity: Option<Vec<Color>>,
}

/// Outcome of the Commander format legality check for a single card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityCheck {
    pub is_valid: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardValidation {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    /// Cards in the deck including the commander.
    pub total_cards: usize,
    pub land_count: usize,
    /// Non-commander slots still empty.
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckValidation {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
    pub summary: DeckSummary,
}

impl DeckValidation {
    pub fn critical_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_critical()).count()
    }
}
