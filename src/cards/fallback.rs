//! Synthetic stand-ins for a handful of staples, used when the card data
//! source cannot answer. Every card here is flagged `is_fallback`.

use crate::models::{name_key, Card, Category, Color, Legalities, Legality};

struct FallbackSpec {
    name: &'static str,
    type_line: &'static str,
    mana_cost: Option<&'static str>,
    mana_value: f64,
    color_identity: &'static [Color],
    oracle_text: &'static str,
    category: Category,
}

const FALLBACK_CARDS: &[FallbackSpec] = &[
    FallbackSpec {
        name: "Sol Ring",
        type_line: "Artifact",
        mana_cost: Some("{1}"),
        mana_value: 1.0,
        color_identity: &[],
        oracle_text: "{T}: Add {C}{C}.",
        category: Category::Ramp,
    },
    FallbackSpec {
        name: "Arcane Signet",
        type_line: "Artifact",
        mana_cost: Some("{2}"),
        mana_value: 2.0,
        color_identity: &[],
        oracle_text: "{T}: Add one mana of any color in your commander's color identity.",
        category: Category::Ramp,
    },
    FallbackSpec {
        name: "Command Tower",
        type_line: "Land",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[],
        oracle_text: "{T}: Add one mana of any color in your commander's color identity.",
        category: Category::Lands,
    },
    FallbackSpec {
        name: "Plains",
        type_line: "Basic Land — Plains",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[Color::White],
        oracle_text: "({T}: Add {W}.)",
        category: Category::Lands,
    },
    FallbackSpec {
        name: "Island",
        type_line: "Basic Land — Island",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[Color::Blue],
        oracle_text: "({T}: Add {U}.)",
        category: Category::Lands,
    },
    FallbackSpec {
        name: "Swamp",
        type_line: "Basic Land — Swamp",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[Color::Black],
        oracle_text: "({T}: Add {B}.)",
        category: Category::Lands,
    },
    FallbackSpec {
        name: "Mountain",
        type_line: "Basic Land — Mountain",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[Color::Red],
        oracle_text: "({T}: Add {R}.)",
        category: Category::Lands,
    },
    FallbackSpec {
        name: "Forest",
        type_line: "Basic Land — Forest",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[Color::Green],
        oracle_text: "({T}: Add {G}.)",
        category: Category::Lands,
    },
    FallbackSpec {
        name: "Wastes",
        type_line: "Basic Land",
        mana_cost: None,
        mana_value: 0.0,
        color_identity: &[],
        oracle_text: "{T}: Add {C}.",
        category: Category::Lands,
    },
];

/// Synthetic card data for `name`, if it is one of the covered staples.
pub fn fallback_card(name: &str) -> Option<Card> {
    let key = name_key(name);
    FALLBACK_CARDS
        .iter()
        .find(|entry| name_key(entry.name) == key)
        .map(|entry| Card {
            name: entry.name.to_string(),
            color_identity: entry.color_identity.to_vec(),
            type_line: entry.type_line.to_string(),
            legalities: Legalities::commander(Legality::Legal),
            mana_value: entry.mana_value,
            mana_cost: entry.mana_cost.map(str::to_string),
            oracle_text: Some(entry.oracle_text.to_string()),
            category: Some(entry.category),
            price_usd: None,
            is_resolved: true,
            is_fallback: true,
        })
}

/// Names covered by [`fallback_card`].
pub fn fallback_names() -> impl Iterator<Item = &'static str> {
    FALLBACK_CARDS.iter().map(|entry| entry.name)
}
