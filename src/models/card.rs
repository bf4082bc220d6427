use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One of the five colors of Magic, serialized as its WUBRG letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Color> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "W" => Some(Color::White),
            "U" => Some(Color::Blue),
            "B" => Some(Color::Black),
            "R" => Some(Color::Red),
            "G" => Some(Color::Green),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Color::White => "W",
            Color::Blue => "U",
            Color::Black => "B",
            Color::Red => "R",
            Color::Green => "G",
        }
    }

    /// The basic land type that produces this color.
    pub fn basic_land(self) -> &'static str {
        match self {
            Color::White => "Plains",
            Color::Blue => "Island",
            Color::Black => "Swamp",
            Color::Red => "Mountain",
            Color::Green => "Forest",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parse color letters, silently skipping anything that is not W, U, B, R or G.
pub fn parse_colors<S: AsRef<str>>(symbols: &[S]) -> Vec<Color> {
    let mut colors: Vec<Color> = symbols
        .iter()
        .filter_map(|s| Color::from_symbol(s.as_ref()))
        .collect();
    colors.sort();
    colors.dedup();
    colors
}

/// True if every color in `card` also appears in `commander`.
pub fn is_within_identity(card: &[Color], commander: &[Color]) -> bool {
    card.iter().all(|c| commander.contains(c))
}

/// Render a color identity as `"W, U, B"` or `"Colorless"`.
pub fn format_identity(colors: &[Color]) -> String {
    if colors.is_empty() {
        return "Colorless".to_string();
    }
    colors
        .iter()
        .map(|c| c.symbol())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Legality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Legality {
    Legal,
    Banned,
    #[serde(other)]
    NotLegal,
}

/// Format legalities the pipeline cares about. Only Commander is tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legalities {
    pub commander: Option<Legality>,
}

impl Legalities {
    pub fn commander(legality: Legality) -> Self {
        Self {
            commander: Some(legality),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Functional role a card fills in a Commander deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Lands,
    Ramp,
    CardDraw,
    Removal,
    BoardWipes,
    Protection,
    Strategy,
    Utility,
    Finisher,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Lands => "Lands",
            Category::Ramp => "Ramp",
            Category::CardDraw => "Card Draw",
            Category::Removal => "Removal",
            Category::BoardWipes => "Board Wipes",
            Category::Protection => "Protection",
            Category::Strategy => "Strategy",
            Category::Utility => "Utility",
            Category::Finisher => "Finisher",
        }
    }

    /// Lenient parse of a free-form category tag. Unrecognized tags map to
    /// [`Category::Utility`].
    pub fn from_label(label: &str) -> Category {
        let norm: String = label
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match norm.as_str() {
            "land" | "lands" | "manabase" => Category::Lands,
            "ramp" | "manaramp" | "rocks" | "manarocks" => Category::Ramp,
            "draw" | "carddraw" | "cardadvantage" => Category::CardDraw,
            "removal" | "spotremoval" | "interaction" => Category::Removal,
            "boardwipe" | "boardwipes" | "wrath" | "wraths" | "sweeper" | "sweepers" => {
                Category::BoardWipes
            }
            "protection" => Category::Protection,
            "strategy" | "synergy" | "theme" => Category::Strategy,
            "finisher" | "finishers" | "wincon" | "wincondition" => Category::Finisher,
            _ => Category::Utility,
        }
    }

    /// Phrase that marks a card as filling this role, matched against name,
    /// type line and rules text when backfilling lost slots. Roles too broad
    /// for one phrase have none.
    pub fn search_term(self) -> Option<&'static str> {
        match self {
            Category::Lands => Some("land"),
            Category::Ramp => Some("add {"),
            Category::CardDraw => Some("draw"),
            Category::Removal => Some("destroy target"),
            Category::BoardWipes => Some("destroy all"),
            Category::Protection => Some("hexproof"),
            Category::Finisher => Some("win the game"),
            Category::Strategy | Category::Utility => None,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::from_label(&s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// Basic land names, used to recognise basics before card data is resolved.
pub const BASIC_LAND_NAMES: &[&str] = &[
    "plains",
    "island",
    "swamp",
    "mountain",
    "forest",
    "wastes",
    "snow-covered plains",
    "snow-covered island",
    "snow-covered swamp",
    "snow-covered mountain",
    "snow-covered forest",
    "snow-covered wastes",
];

/// A single Magic card as the pipeline sees it.
///
/// Cards proposed by the model start out *provisional*: only `name` and
/// `category` are known. Resolution through a
/// [`CardSource`](crate::cards::CardSource) fills in the rest and sets
/// `is_resolved`. Synthetic stand-ins used during data-source outages also
/// carry `is_fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub color_identity: Vec<Color>,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub legalities: Legalities,
    #[serde(default)]
    pub mana_value: f64,
    pub mana_cost: Option<String>,
    pub oracle_text: Option<String>,
    pub category: Option<Category>,
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub is_fallback: bool,
}

impl Card {
    /// An unresolved card known only by name and intended role.
    pub fn provisional(name: impl Into<String>, category: Option<Category>) -> Self {
        Self {
            name: name.into(),
            color_identity: Vec::new(),
            type_line: String::new(),
            legalities: Legalities::default(),
            mana_value: 0.0,
            mana_cost: None,
            oracle_text: None,
            category,
            price_usd: None,
            is_resolved: false,
            is_fallback: false,
        }
    }

    /// Case-insensitive, trimmed key used for every name comparison.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    fn type_has(&self, word: &str) -> bool {
        self.type_line
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .any(|w| w.eq_ignore_ascii_case(word))
    }

    pub fn is_land(&self) -> bool {
        if self.type_line.is_empty() {
            return self.category == Some(Category::Lands) || self.is_basic_land();
        }
        self.type_has("Land")
    }

    /// Basic lands are exempt from the singleton rule.
    pub fn is_basic_land(&self) -> bool {
        if self.type_line.is_empty() {
            return BASIC_LAND_NAMES.contains(&self.key().as_str());
        }
        self.type_has("Basic") && self.type_has("Land")
    }

    pub fn is_legendary(&self) -> bool {
        self.type_has("Legendary")
    }

    pub fn is_creature(&self) -> bool {
        self.type_has("Creature")
    }

    pub fn oracle_contains(&self, needle: &str) -> bool {
        self.oracle_text
            .as_deref()
            .map(|t| t.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }
}

/// Normalize a card name for comparison.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
