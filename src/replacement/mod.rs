//! Substitutes for flagged cards and collision-free application to a deck.

pub mod apply;
pub mod propose;
pub mod tables;

pub use apply::{apply, apply_replacements, deck_keys, Substitution, SubstitutionSource};
pub use propose::ReplacementGenerator;
pub use tables::{banned_substitutes, category_fallbacks, Staple};
