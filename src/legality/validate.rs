//! Card and deck validation against Commander format rules.
//!
//! Every function here is pure: no I/O, no panics, same output for the same
//! input. Missing structural input (no commander) fails closed; missing
//! optional data (unknown legality, unresolved colors) passes.

use std::collections::HashMap;

use crate::config::DECK_SIZE;
use crate::legality::ban_list::is_card_banned;
use crate::legality::color_identity::{known_color_identity, validate_color_identity};
use crate::models::{
    format_identity, is_within_identity, name_key, ArchetypeRules, Card, CardValidation,
    DeckSummary, DeckValidation, Legality, LegalityCheck, Severity, Violation, ViolationType,
};

/// Placeholder card name for violations that concern the whole deck.
pub const DECK_LEVEL: &str = "Deck";

/// Cards printed with "A deck can have any number of cards named ...",
/// recognised even before oracle text is resolved. `None` means unlimited.
const COPY_LIMIT_EXCEPTIONS: &[(&str, Option<usize>)] = &[
    ("Relentless Rats", None),
    ("Shadowborn Apostle", None),
    ("Persistent Petitioners", None),
    ("Rat Colony", None),
    ("Dragon's Approach", None),
    ("Slime Against Humanity", None),
    ("Hare Apparent", None),
    ("Templar Knight", None),
    ("Cid, Timeless Artificer", None),
    ("Seven Dwarves", Some(7)),
    ("Nazgûl", Some(9)),
];

/// How many copies of `card` a Commander deck may contain. `None` is unlimited.
pub fn copy_limit(card: &Card) -> Option<usize> {
    if card.is_basic_land() {
        return None;
    }
    let key = card.key();
    if let Some((_, limit)) = COPY_LIMIT_EXCEPTIONS
        .iter()
        .find(|(name, _)| name_key(name) == key)
    {
        return *limit;
    }
    if card.oracle_contains("a deck can have any number of cards named") {
        return None;
    }
    Some(1)
}

/// Whether `card` may lead a Commander deck.
pub fn is_commander_eligible(card: &Card) -> bool {
    (card.is_legendary() && card.is_creature()) || card.oracle_contains("can be your commander")
}

/// Check a card against the Commander ban list and its own legality data.
///
/// The ban list wins over any externally supplied legality. Cards without
/// legality data are treated as legal.
pub fn validate_format_legality(card: &Card) -> LegalityCheck {
    if is_card_banned(&card.name) {
        return LegalityCheck {
            is_valid: false,
            reason: Some(format!("{} is banned in Commander", card.name.trim())),
        };
    }
    if card.legalities.commander == Some(Legality::Banned) {
        return LegalityCheck {
            is_valid: false,
            reason: Some(format!(
                "{} is marked banned in Commander by card data",
                card.name.trim()
            )),
        };
    }
    LegalityCheck {
        is_valid: true,
        reason: None,
    }
}

/// Validate one non-commander card: ban status and color identity.
///
/// A card can collect several violations at once; all are returned.
pub fn validate_card(card: &Card, commander: Option<&Card>) -> CardValidation {
    let mut violations = Vec::new();

    let legality = validate_format_legality(card);
    if !legality.is_valid {
        violations.push(Violation::new(
            card.name.clone(),
            ViolationType::BannedCard,
            Severity::Critical,
            legality.reason.unwrap_or_default(),
        ));
    }

    if let Some(v) = color_identity_violation(card, commander) {
        violations.push(v);
    }

    CardValidation {
        is_valid: violations.is_empty(),
        violations,
    }
}

fn color_identity_violation(card: &Card, commander: Option<&Card>) -> Option<Violation> {
    let commander_identity = commander.map(|c| c.color_identity.as_slice());

    // Offline table first; it also covers the missing-commander case.
    let check = validate_color_identity(&card.name, commander_identity);
    if !check.is_valid {
        return Some(Violation::new(
            card.name.clone(),
            ViolationType::ColorIdentity,
            Severity::Critical,
            check.reason.unwrap_or_default(),
        ));
    }

    let commander_identity = commander_identity?;
    if known_color_identity(&card.name).is_some() || !card.is_resolved {
        return None;
    }
    if is_within_identity(&card.color_identity, commander_identity) {
        return None;
    }
    Some(Violation::new(
        card.name.clone(),
        ViolationType::ColorIdentity,
        Severity::Critical,
        format!(
            "{} has color identity {} outside the commander's {}",
            card.name.trim(),
            format_identity(&card.color_identity),
            format_identity(commander_identity)
        ),
    ))
}

fn validate_commander(commander: Option<&Card>) -> Vec<Violation> {
    let Some(commander) = commander else {
        return vec![Violation::new(
            DECK_LEVEL,
            ViolationType::InvalidCommander,
            Severity::Critical,
            "No commander selected",
        )];
    };

    let mut violations = Vec::new();
    if !is_commander_eligible(commander) {
        violations.push(Violation::new(
            commander.name.clone(),
            ViolationType::InvalidCommander,
            Severity::Critical,
            format!(
                "{} is not a legendary creature and cannot be your commander",
                commander.name.trim()
            ),
        ));
    }
    let legality = validate_format_legality(commander);
    if !legality.is_valid {
        violations.push(Violation::new(
            commander.name.clone(),
            ViolationType::BannedCard,
            Severity::Critical,
            legality.reason.unwrap_or_default(),
        ));
    }
    violations
}

/// Validate a whole deck: commander eligibility, size, singleton and every
/// per-card check.
///
/// `cards` excludes the commander. For duplicates the first occurrence is
/// kept and each later one is flagged once.
pub fn validate_deck(cards: &[Card], commander: Option<&Card>) -> DeckValidation {
    let mut violations = validate_commander(commander);

    if cards.len() > DECK_SIZE {
        violations.push(Violation::new(
            DECK_LEVEL,
            ViolationType::DeckSize,
            Severity::Critical,
            format!(
                "Deck has {} cards besides the commander; Commander allows exactly {}",
                cards.len(),
                DECK_SIZE
            ),
        ));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    if let Some(commander) = commander {
        seen.insert(commander.key(), 1);
    }

    for card in cards {
        let count = seen.entry(card.key()).or_insert(0);
        *count += 1;
        if let Some(limit) = copy_limit(card) {
            if *count > limit {
                violations.push(Violation::new(
                    card.name.clone(),
                    ViolationType::SingletonViolation,
                    Severity::Critical,
                    format!(
                        "{} appears more than {} time{}",
                        card.name.trim(),
                        limit,
                        if limit == 1 { "" } else { "s" }
                    ),
                ));
            }
        }

        violations.extend(validate_card(card, commander).violations);
    }

    let summary = DeckSummary {
        total_cards: cards.len() + usize::from(commander.is_some()),
        land_count: count_lands(cards),
        missing: DECK_SIZE.saturating_sub(cards.len()),
    };

    DeckValidation {
        is_valid: violations.is_empty(),
        violations,
        summary,
    }
}

pub fn count_lands(cards: &[Card]) -> usize {
    cards.iter().filter(|c| c.is_land()).count()
}

/// Advisory land-count check against the archetype's land range.
///
/// Not part of [`validate_deck`]; a deck with an unusual land count is still
/// legal.
pub fn check_land_count(cards: &[Card], rules: &ArchetypeRules) -> Option<Violation> {
    let lands = count_lands(cards);
    let range = rules.targets.lands;
    if range.contains(lands) {
        return None;
    }
    let direction = if lands < range.min { "below" } else { "above" };
    Some(Violation::new(
        DECK_LEVEL,
        ViolationType::LandCount,
        Severity::Minor,
        format!(
            "{} lands is {} the {} target for {}",
            lands,
            direction,
            range,
            rules.archetype.label()
        ),
    ))
}
