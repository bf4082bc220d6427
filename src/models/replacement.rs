use serde::{Deserialize, Serialize};

use super::card::Category;

/// One candidate substitute for a flagged card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCard {
    pub name: String,
    #[serde(default)]
    pub reason: String,
    /// 0-10, higher is a better fit for the commander's plan.
    #[serde(default)]
    pub synergy_score: f64,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub mana_value: f64,
}

fn default_category() -> Category {
    Category::Utility
}

impl SuggestedCard {
    pub fn new(name: impl Into<String>, reason: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
            synergy_score: 5.0,
            category,
            mana_value: 0.0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.synergy_score = score;
        self
    }

    pub fn with_mana_value(mut self, mana_value: f64) -> Self {
        self.mana_value = mana_value;
        self
    }
}

/// Ordered substitutes for one flagged card, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    pub original_card: String,
    pub suggested_cards: Vec<SuggestedCard>,
    #[serde(default)]
    pub reasoning: String,
}
