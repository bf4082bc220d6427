//! Offline color identity table for cards that are easy to get wrong.
//!
//! Multicolor lands and mana rocks are the usual traps: their names hide the
//! colors they carry. Any card absent from this table is provisionally
//! accepted; the authoritative check runs once resolved card data carries a
//! real color identity.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::{format_identity, is_within_identity, name_key, Color, ColorIdentityCheck};

use Color::{Black as B, Blue as U, Green as G, Red as R, White as W};

pub const KNOWN_COLOR_IDENTITIES: &[(&str, &[Color])] = &[
    // Triomes
    ("Raugrin Triome", &[R, U, W]),
    ("Savai Triome", &[R, W, B]),
    ("Zagoth Triome", &[B, G, U]),
    ("Ketria Triome", &[G, U, R]),
    ("Indatha Triome", &[W, B, G]),
    ("Jetmir's Garden", &[R, G, W]),
    ("Spara's Headquarters", &[G, W, U]),
    ("Raffine's Tower", &[W, U, B]),
    ("Xander's Lounge", &[U, B, R]),
    ("Ziatora's Proving Ground", &[B, R, G]),
    // Shocklands
    ("Hallowed Fountain", &[W, U]),
    ("Watery Grave", &[U, B]),
    ("Blood Crypt", &[B, R]),
    ("Stomping Ground", &[R, G]),
    ("Temple Garden", &[G, W]),
    ("Godless Shrine", &[W, B]),
    ("Steam Vents", &[U, R]),
    ("Overgrown Tomb", &[B, G]),
    ("Sacred Foundry", &[R, W]),
    ("Breeding Pool", &[G, U]),
    // Talismans
    ("Talisman of Progress", &[W, U]),
    ("Talisman of Dominance", &[U, B]),
    ("Talisman of Indulgence", &[B, R]),
    ("Talisman of Impulse", &[R, G]),
    ("Talisman of Unity", &[G, W]),
    ("Talisman of Hierarchy", &[W, B]),
    ("Talisman of Creativity", &[U, R]),
    ("Talisman of Resilience", &[B, G]),
    ("Talisman of Conviction", &[R, W]),
    ("Talisman of Curiosity", &[G, U]),
    // Signets
    ("Azorius Signet", &[W, U]),
    ("Dimir Signet", &[U, B]),
    ("Rakdos Signet", &[B, R]),
    ("Gruul Signet", &[R, G]),
    ("Selesnya Signet", &[G, W]),
    ("Orzhov Signet", &[W, B]),
    ("Izzet Signet", &[U, R]),
    ("Golgari Signet", &[B, G]),
    ("Boros Signet", &[R, W]),
    ("Simic Signet", &[G, U]),
];

static KNOWN: Lazy<HashMap<String, &'static [Color]>> = Lazy::new(|| {
    KNOWN_COLOR_IDENTITIES
        .iter()
        .map(|(name, colors)| (name_key(name), *colors))
        .collect()
});

/// Color identity from the offline table, if the card is listed.
pub fn known_color_identity(name: &str) -> Option<&'static [Color]> {
    KNOWN.get(&name_key(name)).copied()
}

/// Check a card name against the commander's color identity using the
/// offline table.
///
/// `commander_identity` of `None` is invalid input and fails. Cards the
/// table does not know pass.
pub fn validate_color_identity(name: &str, commander_identity: Option<&[Color]>) -> ColorIdentityCheck {
    let Some(commander_identity) = commander_identity else {
        return ColorIdentityCheck {
            is_valid: false,
            reason: Some("Commander color identity is missing".to_string()),
            card_color_identity: None,
        };
    };

    match known_color_identity(name) {
        Some(card_identity) if !is_within_identity(card_identity, commander_identity) => {
            ColorIdentityCheck {
                is_valid: false,
                reason: Some(format!(
                    "{} has color identity {} outside the commander's {}",
                    name.trim(),
                    format_identity(card_identity),
                    format_identity(commander_identity)
                )),
                card_color_identity: Some(card_identity.to_vec()),
            }
        }
        Some(card_identity) => ColorIdentityCheck {
            is_valid: true,
            reason: None,
            card_color_identity: Some(card_identity.to_vec()),
        },
        None => ColorIdentityCheck {
            is_valid: true,
            reason: None,
            card_color_identity: None,
        },
    }
}
