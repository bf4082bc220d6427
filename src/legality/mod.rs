//! Deterministic Commander legality rules.
//!
//! Two tiers of color checking: a fast offline table of known traps here,
//! and the authoritative subset check once cards carry resolved data.

pub mod ban_list;
pub mod color_identity;
pub mod validate;

pub use ban_list::{is_card_banned, BANNED_CARDS};
pub use color_identity::{known_color_identity, validate_color_identity};
pub use validate::{
    check_land_count, copy_limit, count_lands, is_commander_eligible, validate_card,
    validate_deck, validate_format_legality, DECK_LEVEL,
};
