use serde::{Deserialize, Serialize};
use std::fmt;

use super::card::Category;

/// Inclusive card-count bounds for one deck category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }

    /// Midpoint, used when a single target number is needed.
    pub fn target(&self) -> usize {
        (self.min + self.max) / 2
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTargets {
    pub lands: CountRange,
    pub ramp: CountRange,
    pub draw: CountRange,
    pub removal: CountRange,
    pub board_wipes: CountRange,
    pub protection: CountRange,
    pub strategy: CountRange,
}

impl CategoryTargets {
    /// Pairs of category and range in prompt order.
    pub fn entries(&self) -> [(Category, CountRange); 7] {
        [
            (Category::Lands, self.lands),
            (Category::Ramp, self.ramp),
            (Category::CardDraw, self.draw),
            (Category::Removal, self.removal),
            (Category::BoardWipes, self.board_wipes),
            (Category::Protection, self.protection),
            (Category::Strategy, self.strategy),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Aggro,
    Midrange,
    Control,
    Combo,
    Voltron,
    Tokens,
}

impl Archetype {
    pub fn label(self) -> &'static str {
        match self {
            Archetype::Aggro => "Aggro",
            Archetype::Midrange => "Midrange",
            Archetype::Control => "Control",
            Archetype::Combo => "Combo",
            Archetype::Voltron => "Voltron",
            Archetype::Tokens => "Tokens",
        }
    }
}

/// Card-count distribution, budget and power level for one build request.
///
/// Built once per request and passed by reference from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeRules {
    pub archetype: Archetype,
    /// Commander bracket range, 1 (exhibition) through 5 (cEDH).
    pub power_bracket: (u8, u8),
    /// Budget ceiling in USD. `None` means unlimited.
    pub max_budget: Option<f64>,
    pub targets: CategoryTargets,
}

impl Default for ArchetypeRules {
    fn default() -> Self {
        Self::preset(Archetype::Midrange)
    }
}

impl ArchetypeRules {
    pub fn preset(archetype: Archetype) -> Self {
        let r = CountRange::new;
        let targets = match archetype {
            Archetype::Aggro => CategoryTargets {
                lands: r(33, 35),
                ramp: r(8, 10),
                draw: r(8, 10),
                removal: r(6, 8),
                board_wipes: r(0, 1),
                protection: r(3, 5),
                strategy: r(32, 38),
            },
            Archetype::Midrange => CategoryTargets {
                lands: r(35, 38),
                ramp: r(10, 12),
                draw: r(10, 12),
                removal: r(8, 10),
                board_wipes: r(2, 4),
                protection: r(3, 5),
                strategy: r(25, 30),
            },
            Archetype::Control => CategoryTargets {
                lands: r(36, 38),
                ramp: r(10, 12),
                draw: r(12, 15),
                removal: r(10, 14),
                board_wipes: r(4, 6),
                protection: r(2, 4),
                strategy: r(15, 20),
            },
            Archetype::Combo => CategoryTargets {
                lands: r(32, 35),
                ramp: r(12, 15),
                draw: r(12, 15),
                removal: r(6, 8),
                board_wipes: r(1, 2),
                protection: r(5, 7),
                strategy: r(20, 25),
            },
            Archetype::Voltron => CategoryTargets {
                lands: r(35, 37),
                ramp: r(10, 12),
                draw: r(8, 10),
                removal: r(6, 8),
                board_wipes: r(1, 2),
                protection: r(8, 12),
                strategy: r(25, 30),
            },
            Archetype::Tokens => CategoryTargets {
                lands: r(35, 37),
                ramp: r(10, 12),
                draw: r(10, 12),
                removal: r(7, 9),
                board_wipes: r(1, 3),
                protection: r(3, 5),
                strategy: r(28, 33),
            },
        };
        Self {
            archetype,
            power_bracket: (2, 3),
            max_budget: None,
            targets,
        }
    }

    pub fn with_budget(mut self, max_budget: f64) -> Self {
        self.max_budget = if max_budget.is_finite() && max_budget > 0.0 {
            Some(max_budget)
        } else {
            None
        };
        self
    }

    /// Set the bracket range; bounds are clamped to 1..=5 and ordered.
    pub fn with_power_bracket(mut self, low: u8, high: u8) -> Self {
        let low = low.clamp(1, 5);
        let high = high.clamp(1, 5);
        self.power_bracket = (low.min(high), low.max(high));
        self
    }

    pub fn with_targets(mut self, targets: CategoryTargets) -> Self {
        self.targets = targets;
        self
    }
}
