use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{debug, info, warn};

use crate::cards::CardSource;
use crate::completion::CompletionService;
use crate::config;
use crate::error::Result;
use crate::generator::{parse_model_json, Shape};
use crate::legality::{is_card_banned, validate_color_identity};
use crate::models::{
    format_identity, is_within_identity, name_key, BuildNotice, Card, Category, Replacement,
    SuggestedCard, Violation,
};
use crate::replacement::tables::{banned_substitutes, category_fallbacks, Staple, GENERIC_STAPLES};

const REPLACEMENT_SYSTEM_PROMPT: &str = "You are an expert Magic: The Gathering Commander deck \
builder. You suggest legal, on-theme replacements for problem cards and answer with JSON only.";

/// Candidates per flagged card.
const MAX_SUGGESTIONS: usize = 3;

/// Proposes substitutes for flagged cards.
///
/// Banned cards get table substitutes immediately. Everything else goes to
/// the model when one is configured; suggestions that fail re-validation are
/// discarded and category fallbacks fill any empty result.
pub struct ReplacementGenerator<'a> {
    completion: Option<&'a dyn CompletionService>,
    cards: Option<&'a dyn CardSource>,
}

impl<'a> ReplacementGenerator<'a> {
    pub fn new(completion: Option<&'a dyn CompletionService>) -> Self {
        Self {
            completion,
            cards: None,
        }
    }

    /// Use `source` to check suggested cards against real color identity.
    pub fn with_card_source(mut self, source: &'a dyn CardSource) -> Self {
        self.cards = Some(source);
        self
    }

    pub fn propose(
        &self,
        violations: &[Violation],
        commander: &Card,
        current_deck: &[Card],
    ) -> Vec<Replacement> {
        self.propose_with_notices(violations, commander, current_deck).0
    }

    /// Like [`propose`](Self::propose), also returning a notice for every
    /// suggestion that failed re-validation.
    pub fn propose_with_notices(
        &self,
        violations: &[Violation],
        commander: &Card,
        current_deck: &[Card],
    ) -> (Vec<Replacement>, Vec<BuildNotice>) {
        let mut notices = Vec::new();
        let mut replacements = Vec::new();
        let mut ai_bucket: Vec<&Violation> = Vec::new();

        for violation in violations.iter().filter(|v| v.kind.is_replaceable()) {
            if is_card_banned(&violation.card) {
                replacements.push(self.banned_replacement(violation, commander, current_deck));
            } else {
                ai_bucket.push(violation);
            }
        }

        if !ai_bucket.is_empty() {
            let mut suggested = match self.completion {
                Some(completion) => {
                    match self.ask_model(completion, &ai_bucket, commander, current_deck) {
                        Ok(found) => found,
                        Err(e) => {
                            warn!("AI replacement request failed, using fallbacks: {}", e);
                            HashMap::new()
                        }
                    }
                }
                None => HashMap::new(),
            };

            for violation in ai_bucket {
                let mut candidates: Vec<SuggestedCard> = Vec::new();
                if let Some(name) = violation.suggested_replacement.as_deref() {
                    candidates.push(SuggestedCard::new(
                        name,
                        "Suggested by the validation scan",
                        category_of(&violation.card, current_deck),
                    ));
                }
                let (model_candidates, reasoning) = suggested
                    .remove(&name_key(&violation.card))
                    .unwrap_or_default();
                candidates.extend(model_candidates);

                let mut accepted = Vec::new();
                for candidate in candidates {
                    match self.revalidate(&candidate.name, &violation.card, commander) {
                        Ok(()) => {
                            if !accepted
                                .iter()
                                .any(|c: &SuggestedCard| name_key(&c.name) == name_key(&candidate.name))
                            {
                                accepted.push(candidate);
                            }
                        }
                        Err(reason) => {
                            debug!(name = %candidate.name, %reason, "Rejected suggestion");
                            notices.push(BuildNotice::RejectedSuggestion {
                                name: candidate.name.clone(),
                                reason,
                            });
                        }
                    }
                }
                accepted.truncate(MAX_SUGGESTIONS);

                let reasoning = if accepted.is_empty() {
                    let category = category_of(&violation.card, current_deck);
                    accepted = staple_suggestions(
                        category_fallbacks(category),
                        commander,
                        current_deck,
                        &violation.card,
                    );
                    format!("Fallback {} staples for {}", category, violation.card)
                } else if reasoning.is_empty() {
                    violation.reason.clone()
                } else {
                    reasoning
                };

                replacements.push(Replacement {
                    original_card: violation.card.clone(),
                    suggested_cards: accepted,
                    reasoning,
                });
            }
        }

        info!("Proposed replacements for {} cards", replacements.len());
        (replacements, notices)
    }

    fn banned_replacement(
        &self,
        violation: &Violation,
        commander: &Card,
        current_deck: &[Card],
    ) -> Replacement {
        let (table, reasoning) = match banned_substitutes(&violation.card) {
            Some(subs) => (subs, format!("{} is banned; known substitutes", violation.card)),
            None => (
                GENERIC_STAPLES,
                format!("{} is banned; generic staples", violation.card),
            ),
        };
        // Deck collisions are left to the apply step, which walks the list.
        let mut suggested: Vec<SuggestedCard> = table
            .iter()
            .filter(|s| is_within_identity(s.colors, &commander.color_identity))
            .map(|s| to_suggestion(s, format!("Replaces banned {}", violation.card)))
            .collect();
        if suggested.is_empty() {
            suggested = staple_suggestions(GENERIC_STAPLES, commander, current_deck, &violation.card);
        }
        Replacement {
            original_card: violation.card.clone(),
            suggested_cards: suggested,
            reasoning,
        }
    }

    /// Ban check, then color identity from the offline table and, when a
    /// card source is configured, from real card data.
    fn revalidate(
        &self,
        name: &str,
        original: &str,
        commander: &Card,
    ) -> std::result::Result<(), String> {
        if name.trim().is_empty() {
            return Err("empty card name".to_string());
        }
        if name_key(name) == name_key(original) {
            return Err("same as the card being replaced".to_string());
        }
        if is_card_banned(name) {
            return Err("banned in Commander".to_string());
        }
        let check = validate_color_identity(name, Some(&commander.color_identity));
        if !check.is_valid {
            return Err(check.reason.unwrap_or_else(|| "outside color identity".to_string()));
        }
        if let Some(source) = self.cards {
            match source.lookup_by_name(name) {
                Ok(Some(card)) => {
                    if !is_within_identity(&card.color_identity, &commander.color_identity) {
                        return Err(format!(
                            "color identity {} outside {}",
                            format_identity(&card.color_identity),
                            format_identity(&commander.color_identity)
                        ));
                    }
                    if card.legalities.commander == Some(crate::models::Legality::Banned) {
                        return Err("banned in Commander".to_string());
                    }
                }
                Ok(None) => return Err("no such card".to_string()),
                Err(e) => debug!("Could not resolve suggestion {}: {}", name, e),
            }
        }
        Ok(())
    }

    fn ask_model(
        &self,
        completion: &dyn CompletionService,
        violations: &[&Violation],
        commander: &Card,
        current_deck: &[Card],
    ) -> Result<HashMap<String, (Vec<SuggestedCard>, String)>> {
        let prompt = replacement_prompt(violations, commander, current_deck);
        let raw = completion.complete(
            REPLACEMENT_SYSTEM_PROMPT,
            &prompt,
            config::REPLACEMENT_MAX_TOKENS,
        )?;

        let entries = match parse_model_json(&raw, Shape::Object) {
            Ok((Value::Object(mut map), _)) => match map.remove("replacements") {
                Some(Value::Array(list)) => list,
                _ => Vec::new(),
            },
            _ => {
                let (value, _) = parse_model_json(&raw, Shape::Array)?;
                value.as_array().cloned().unwrap_or_default()
            }
        };

        let mut out = HashMap::new();
        for entry in entries {
            if let Ok(replacement) = serde_json::from_value::<Replacement>(entry) {
                out.insert(
                    name_key(&replacement.original_card),
                    (replacement.suggested_cards, replacement.reasoning),
                );
            }
        }
        Ok(out)
    }
}

fn replacement_prompt(violations: &[&Violation], commander: &Card, current_deck: &[Card]) -> String {
    let mut p = String::new();
    let _ = writeln!(
        p,
        "Commander: {} (color identity: {})",
        commander.name,
        format_identity(&commander.color_identity)
    );
    if let Some(text) = commander.oracle_text.as_deref() {
        let _ = writeln!(p, "Commander text: {}", text.replace('\n', " "));
    }
    let _ = writeln!(p);

    let names: Vec<&str> = current_deck.iter().map(|c| c.name.as_str()).collect();
    let _ = writeln!(p, "Current deck ({} cards): {}", names.len(), names.join(", "));
    let _ = writeln!(p);

    let _ = writeln!(p, "Replace these problem cards:");
    for v in violations {
        let card = current_deck.iter().find(|c| c.key() == name_key(&v.card));
        let category = card.and_then(|c| c.category).unwrap_or(Category::Utility);
        let mana_value = card.map(|c| c.mana_value).unwrap_or(0.0);
        let _ = writeln!(
            p,
            "- {} [{}; category {}; mana value {}]: {}",
            v.card, v.kind, category, mana_value, v.reason
        );
    }
    let _ = writeln!(p);
    let _ = writeln!(
        p,
        "Suggest up to {} legal replacements per card that fill the same role, stay within the \
         color identity and are not already in the deck.",
        MAX_SUGGESTIONS
    );
    let _ = writeln!(
        p,
        "Respond with JSON only: {{\"replacements\": [{{\"originalCard\": \"Name\", \
         \"suggestedCards\": [{{\"name\": \"Name\", \"reason\": \"...\", \"synergyScore\": 8, \
         \"category\": \"Ramp\", \"manaValue\": 2}}], \"reasoning\": \"...\"}}]}}"
    );
    p
}

fn category_of(name: &str, deck: &[Card]) -> Category {
    let key = name_key(name);
    deck.iter()
        .find(|c| c.key() == key)
        .and_then(|c| c.category)
        .unwrap_or(Category::Utility)
}

fn to_suggestion(staple: &Staple, reason: String) -> SuggestedCard {
    SuggestedCard::new(staple.name, reason, staple.category)
        .with_mana_value(staple.mana_value)
}

/// On-color staples not already in the deck; if every one collides, the
/// on-color list is returned anyway so the apply step can walk past it.
fn staple_suggestions(
    table: &[Staple],
    commander: &Card,
    deck: &[Card],
    original: &str,
) -> Vec<SuggestedCard> {
    let on_color: Vec<&Staple> = table
        .iter()
        .filter(|s| is_within_identity(s.colors, &commander.color_identity))
        .collect();
    let fresh: Vec<&Staple> = on_color
        .iter()
        .copied()
        .filter(|s| !deck.iter().any(|c| c.key() == name_key(s.name)))
        .collect();
    let chosen = if fresh.is_empty() { on_color } else { fresh };
    chosen
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|s| to_suggestion(s, format!("Staple replacement for {}", original)).with_score(4.0))
        .collect()
}
