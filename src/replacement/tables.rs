//! Hand-maintained substitution tables.
//!
//! Each entry carries its color identity so candidates can be filtered
//! against the commander without a data lookup.

use crate::models::{name_key, Category, Color};

use Color::{Black as B, Blue as U, Green as G, Red as R, White as W};

#[derive(Debug, Clone, Copy)]
pub struct Staple {
    pub name: &'static str,
    pub colors: &'static [Color],
    pub mana_value: f64,
    pub category: Category,
}

const fn staple(
    name: &'static str,
    colors: &'static [Color],
    mana_value: f64,
    category: Category,
) -> Staple {
    Staple {
        name,
        colors,
        mana_value,
        category,
    }
}

/// Direct substitutes for banned cards, best first.
pub const BANNED_SUBSTITUTES: &[(&str, &[Staple])] = &[
    (
        "Mana Crypt",
        &[
            staple("Sol Ring", &[], 1.0, Category::Ramp),
            staple("Arcane Signet", &[], 2.0, Category::Ramp),
            staple("Fellwar Stone", &[], 2.0, Category::Ramp),
            staple("Mind Stone", &[], 2.0, Category::Ramp),
        ],
    ),
    (
        "Jeweled Lotus",
        &[
            staple("Arcane Signet", &[], 2.0, Category::Ramp),
            staple("Fellwar Stone", &[], 2.0, Category::Ramp),
            staple("Commander's Sphere", &[], 3.0, Category::Ramp),
        ],
    ),
    (
        "Black Lotus",
        &[
            staple("Arcane Signet", &[], 2.0, Category::Ramp),
            staple("Mind Stone", &[], 2.0, Category::Ramp),
        ],
    ),
    (
        "Dockside Extortionist",
        &[
            staple("Professional Face-Breaker", &[R], 3.0, Category::Ramp),
            staple("Smothering Tithe", &[W], 4.0, Category::Ramp),
            staple("Treasure Map", &[], 2.0, Category::CardDraw),
        ],
    ),
    (
        "Paradox Engine",
        &[
            staple("Unwinding Clock", &[], 4.0, Category::Strategy),
            staple("Isochron Scepter", &[], 2.0, Category::Strategy),
        ],
    ),
    (
        "Panoptic Mirror",
        &[staple("Isochron Scepter", &[], 2.0, Category::Strategy)],
    ),
    (
        "Primeval Titan",
        &[
            staple("Sakura-Tribe Elder", &[G], 2.0, Category::Ramp),
            staple("Solemn Simulacrum", &[], 4.0, Category::Ramp),
        ],
    ),
    (
        "Sylvan Primordial",
        &[
            staple("Terastodon", &[G], 8.0, Category::Removal),
            staple("Solemn Simulacrum", &[], 4.0, Category::Ramp),
        ],
    ),
    (
        "Golos, Tireless Pilgrim",
        &[
            staple("Solemn Simulacrum", &[], 4.0, Category::Ramp),
            staple("Burnished Hart", &[], 3.0, Category::Ramp),
        ],
    ),
    (
        "Fastbond",
        &[
            staple("Exploration", &[G], 1.0, Category::Ramp),
            staple("Burgeoning", &[G], 1.0, Category::Ramp),
        ],
    ),
    (
        "Hullbreacher",
        &[
            staple("Notion Thief", &[U, B], 4.0, Category::CardDraw),
            staple("Mystic Remora", &[U], 1.0, Category::CardDraw),
        ],
    ),
    (
        "Leovold, Emissary of Trest",
        &[staple("Notion Thief", &[U, B], 4.0, Category::CardDraw)],
    ),
    (
        "Tinker",
        &[staple("Fabricate", &[U], 3.0, Category::Utility)],
    ),
    (
        "Trade Secrets",
        &[staple("Rhystic Study", &[U], 3.0, Category::CardDraw)],
    ),
    (
        "Upheaval",
        &[staple("Cyclonic Rift", &[U], 2.0, Category::BoardWipes)],
    ),
    (
        "Gifts Ungiven",
        &[staple("Intuition", &[U], 3.0, Category::Utility)],
    ),
    (
        "Prophet of Kruphix",
        &[staple("Leyline of Anticipation", &[U], 4.0, Category::Strategy)],
    ),
    (
        "Recurring Nightmare",
        &[staple("Animate Dead", &[B], 2.0, Category::Strategy)],
    ),
    (
        "Griselbrand",
        &[staple("Archon of Cruelty", &[B], 8.0, Category::Finisher)],
    ),
    (
        "Iona, Shield of Emeria",
        &[staple("Elesh Norn, Grand Cenobite", &[W], 7.0, Category::Finisher)],
    ),
    (
        "Rofellos, Llanowar Emissary",
        &[staple("Elvish Archdruid", &[G], 3.0, Category::Ramp)],
    ),
    (
        "Sundering Titan",
        &[staple("Wurmcoil Engine", &[], 6.0, Category::Finisher)],
    ),
    (
        "Emrakul, the Aeons Torn",
        &[staple("Ulamog, the Ceaseless Hunger", &[], 10.0, Category::Finisher)],
    ),
];

/// Used for banned cards without a specific entry.
pub const GENERIC_STAPLES: &[Staple] = &[
    staple("Arcane Signet", &[], 2.0, Category::Ramp),
    staple("Mind Stone", &[], 2.0, Category::Ramp),
    staple("Fellwar Stone", &[], 2.0, Category::Ramp),
    staple("Thought Vessel", &[], 2.0, Category::Ramp),
    staple("Solemn Simulacrum", &[], 4.0, Category::Ramp),
    staple("Lightning Greaves", &[], 2.0, Category::Protection),
    staple("Swiftfoot Boots", &[], 2.0, Category::Protection),
];

const LAND_FALLBACKS: &[Staple] = &[
    staple("Command Tower", &[], 0.0, Category::Lands),
    staple("Exotic Orchard", &[], 0.0, Category::Lands),
    staple("Path of Ancestry", &[], 0.0, Category::Lands),
    staple("Myriad Landscape", &[], 0.0, Category::Lands),
    staple("Reliquary Tower", &[], 0.0, Category::Lands),
];

const RAMP_FALLBACKS: &[Staple] = &[
    staple("Arcane Signet", &[], 2.0, Category::Ramp),
    staple("Fellwar Stone", &[], 2.0, Category::Ramp),
    staple("Mind Stone", &[], 2.0, Category::Ramp),
    staple("Thought Vessel", &[], 2.0, Category::Ramp),
    staple("Cultivate", &[G], 3.0, Category::Ramp),
    staple("Talisman of Progress", &[W, U], 2.0, Category::Ramp),
];

const DRAW_FALLBACKS: &[Staple] = &[
    staple("Skullclamp", &[], 1.0, Category::CardDraw),
    staple("Mind's Eye", &[], 5.0, Category::CardDraw),
    staple("Rhystic Study", &[U], 3.0, Category::CardDraw),
    staple("Phyrexian Arena", &[B], 3.0, Category::CardDraw),
    staple("Harmonize", &[G], 4.0, Category::CardDraw),
];

const REMOVAL_FALLBACKS: &[Staple] = &[
    staple("Swords to Plowshares", &[W], 1.0, Category::Removal),
    staple("Beast Within", &[G], 3.0, Category::Removal),
    staple("Chaos Warp", &[R], 3.0, Category::Removal),
    staple("Feed the Swarm", &[B], 2.0, Category::Removal),
    staple("Meteor Golem", &[], 7.0, Category::Removal),
    staple("Duplicant", &[], 6.0, Category::Removal),
];

const BOARD_WIPE_FALLBACKS: &[Staple] = &[
    staple("Wrath of God", &[W], 4.0, Category::BoardWipes),
    staple("Blasphemous Act", &[R], 9.0, Category::BoardWipes),
    staple("Toxic Deluge", &[B], 3.0, Category::BoardWipes),
    staple("Nevinyrral's Disk", &[], 4.0, Category::BoardWipes),
    staple("Oblivion Stone", &[], 3.0, Category::BoardWipes),
];

const PROTECTION_FALLBACKS: &[Staple] = &[
    staple("Lightning Greaves", &[], 2.0, Category::Protection),
    staple("Swiftfoot Boots", &[], 2.0, Category::Protection),
    staple("Heroic Intervention", &[G], 2.0, Category::Protection),
    staple("Teferi's Protection", &[W], 3.0, Category::Protection),
];

const UTILITY_FALLBACKS: &[Staple] = &[
    staple("Solemn Simulacrum", &[], 4.0, Category::Utility),
    staple("Burnished Hart", &[], 3.0, Category::Utility),
    staple("Wayfarer's Bauble", &[], 1.0, Category::Utility),
    staple("Commander's Sphere", &[], 3.0, Category::Utility),
];

const FINISHER_FALLBACKS: &[Staple] = &[
    staple("Wurmcoil Engine", &[], 6.0, Category::Finisher),
    staple("Myr Battlesphere", &[], 7.0, Category::Finisher),
    staple("Walking Ballista", &[], 0.0, Category::Finisher),
];

/// Category-matched candidates for when the model cannot help.
pub fn category_fallbacks(category: Category) -> &'static [Staple] {
    match category {
        Category::Lands => LAND_FALLBACKS,
        Category::Ramp => RAMP_FALLBACKS,
        Category::CardDraw => DRAW_FALLBACKS,
        Category::Removal => REMOVAL_FALLBACKS,
        Category::BoardWipes => BOARD_WIPE_FALLBACKS,
        Category::Protection => PROTECTION_FALLBACKS,
        Category::Strategy | Category::Utility => UTILITY_FALLBACKS,
        Category::Finisher => FINISHER_FALLBACKS,
    }
}

/// Colorless staples walked by the apply step when every suggestion collides.
pub const EXTENDED_FALLBACKS: &[&str] = &[
    "Arcane Signet",
    "Mind Stone",
    "Fellwar Stone",
    "Thought Vessel",
    "Commander's Sphere",
    "Wayfarer's Bauble",
    "Everflowing Chalice",
    "Worn Powerstone",
    "Hedron Archive",
    "Solemn Simulacrum",
    "Burnished Hart",
    "Lightning Greaves",
    "Swiftfoot Boots",
    "Skullclamp",
    "Mind's Eye",
    "Meteor Golem",
    "Duplicant",
    "Nevinyrral's Disk",
    "Oblivion Stone",
    "Wurmcoil Engine",
    "Myr Battlesphere",
    "Exotic Orchard",
    "Reliquary Tower",
    "Myriad Landscape",
    "Path of Ancestry",
];

pub fn banned_substitutes(name: &str) -> Option<&'static [Staple]> {
    let key = name_key(name);
    BANNED_SUBSTITUTES
        .iter()
        .find(|(banned, _)| name_key(banned) == key)
        .map(|(_, subs)| *subs)
}
