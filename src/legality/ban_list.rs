//! The Commander ban list.
//!
//! Lookups are exact after trimming and lower-casing. No fuzzy matching: a
//! near-miss name is never reported as banned.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::models::name_key;

pub const BANNED_CARDS: &[&str] = &[
    "Ancestral Recall",
    "Balance",
    "Biorhythm",
    "Black Lotus",
    "Braids, Cabal Minion",
    "Channel",
    "Chaos Orb",
    "Coalition Victory",
    "Dockside Extortionist",
    "Emrakul, the Aeons Torn",
    "Erayo, Soratami Ascendant",
    "Falling Star",
    "Fastbond",
    "Flash",
    "Gifts Ungiven",
    "Golos, Tireless Pilgrim",
    "Griselbrand",
    "Hullbreacher",
    "Iona, Shield of Emeria",
    "Jeweled Lotus",
    "Karakas",
    "Leovold, Emissary of Trest",
    "Library of Alexandria",
    "Limited Resources",
    "Lutri, the Spellchaser",
    "Mana Crypt",
    "Mox Emerald",
    "Mox Jet",
    "Mox Pearl",
    "Mox Ruby",
    "Mox Sapphire",
    "Nadu, Winged Wisdom",
    "Panoptic Mirror",
    "Paradox Engine",
    "Primeval Titan",
    "Prophet of Kruphix",
    "Recurring Nightmare",
    "Rofellos, Llanowar Emissary",
    "Shahrazad",
    "Sundering Titan",
    "Sway of the Stars",
    "Sylvan Primordial",
    "Time Vault",
    "Time Walk",
    "Tinker",
    "Tolarian Academy",
    "Trade Secrets",
    "Upheaval",
    "Yawgmoth's Bargain",
    // Ante and dexterity cards
    "Bronze Tablet",
    "Contract from Below",
    "Darkpact",
    "Demonic Attorney",
    "Jeweled Bird",
    "Rebirth",
    "Tempest Efreet",
    "Timmerian Fiends",
];

static BANNED_KEYS: Lazy<HashSet<String>> =
    Lazy::new(|| BANNED_CARDS.iter().map(|n| name_key(n)).collect());

/// True if `name` is on the Commander ban list.
///
/// Leading/trailing whitespace and letter case are ignored. An empty name is
/// simply not banned.
pub fn is_card_banned(name: &str) -> bool {
    let key = name_key(name);
    !key.is_empty() && BANNED_KEYS.contains(&key)
}
