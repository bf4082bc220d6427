use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::models::{name_key, Card, Category, Replacement, BASIC_LAND_NAMES};
use crate::replacement::tables::EXTENDED_FALLBACKS;

/// Where a substituted name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionSource {
    Suggested,
    ExtendedFallback,
    Placeholder,
}

/// One slot rewritten by [`apply_replacements`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub slot: usize,
    pub original: String,
    pub replacement: String,
    pub source: SubstitutionSource,
}

/// Replace flagged cards in `deck`, one slot per replacement.
///
/// `used` holds every name key already committed to the deck; callers seed it
/// with the deck (and commander) before the first call and may reuse it across
/// calls. A candidate whose key is in `used` is skipped, so no two slots ever
/// end up with the same non-basic name. When all candidates collide the
/// extended fallback list is walked, then a uniquely named placeholder fills
/// the slot.
pub fn apply_replacements(
    deck: &mut [Card],
    replacements: &[Replacement],
    used: &mut HashSet<String>,
) -> Vec<Substitution> {
    let mut replaced_slots: HashSet<usize> = HashSet::new();
    let mut substitutions = Vec::new();

    for replacement in replacements {
        let original_key = name_key(&replacement.original_card);
        let Some(slot) = (0..deck.len())
            .rev()
            .find(|&i| !replaced_slots.contains(&i) && deck[i].key() == original_key)
        else {
            debug!("{} is no longer in the deck, skipping", replacement.original_card);
            continue;
        };

        let category = deck[slot].category.unwrap_or(Category::Utility);
        let suggested = replacement
            .suggested_cards
            .iter()
            .find(|s| is_free(&s.name, used))
            .map(|s| (s.name.clone(), s.category, s.mana_value, SubstitutionSource::Suggested));

        let chosen = suggested
            .or_else(|| {
                EXTENDED_FALLBACKS.iter().find(|n| is_free(n, used)).map(|n| {
                    (
                        n.to_string(),
                        category,
                        0.0,
                        SubstitutionSource::ExtendedFallback,
                    )
                })
            })
            .unwrap_or_else(|| {
                (
                    placeholder_name(&replacement.original_card, used),
                    category,
                    0.0,
                    SubstitutionSource::Placeholder,
                )
            });

        let (name, category, mana_value, source) = chosen;
        if source != SubstitutionSource::Suggested {
            warn!(
                "Every suggestion for {} collides with the deck, using {}",
                replacement.original_card, name
            );
        }

        used.insert(name_key(&name));
        let mut card = Card::provisional(name.clone(), Some(category));
        card.mana_value = mana_value;
        deck[slot] = card;
        replaced_slots.insert(slot);

        substitutions.push(Substitution {
            slot,
            original: replacement.original_card.clone(),
            replacement: name,
            source,
        });
    }

    info!("Applied {} replacements", substitutions.len());
    substitutions
}

/// Apply `replacements` to a copy of `deck`, tracking names within this call.
pub fn apply(deck: &[Card], replacements: &[Replacement]) -> Vec<Card> {
    let mut out = deck.to_vec();
    let mut used = deck_keys(deck);
    apply_replacements(&mut out, replacements, &mut used);
    out
}

/// Name keys of every card in `deck`.
pub fn deck_keys(deck: &[Card]) -> HashSet<String> {
    deck.iter().map(Card::key).collect()
}

fn is_free(name: &str, used: &HashSet<String>) -> bool {
    let key = name_key(name);
    if key.is_empty() {
        return false;
    }
    BASIC_LAND_NAMES.contains(&key.as_str()) || !used.contains(&key)
}

fn placeholder_name(original: &str, used: &HashSet<String>) -> String {
    let mut n = 1;
    loop {
        let name = format!("Unresolved Slot {} (replacing {})", n, original);
        if !used.contains(&name_key(&name)) {
            return name;
        }
        n += 1;
    }
}
