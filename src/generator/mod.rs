//! Model-driven decklist generation.

pub mod parser;
pub mod prompt;

pub use parser::{parse_model_json, ParseStage, Shape};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::completion::CompletionService;
use crate::config;
use crate::error::{ForgeError, Result};
use crate::legality::{is_card_banned, validate_color_identity};
use crate::models::{ArchetypeRules, Card, Category};

/// Produces a provisional 99-card list for a commander.
pub struct DeckGenerator<'a> {
    completion: Option<&'a dyn CompletionService>,
}

impl<'a> DeckGenerator<'a> {
    pub fn new(completion: Option<&'a dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Ask the model for a decklist and return the surviving entries as
    /// provisional cards.
    ///
    /// # Errors
    ///
    /// * [`ForgeError::Configuration`] when no completion service is set.
    /// * [`ForgeError::Generation`] when `commander` is `None`.
    /// * [`ForgeError::Parse`] when no strategy can read the response.
    /// * [`ForgeError::InsufficientCards`] when fewer than 50 cards survive.
    pub fn generate(&self, commander: Option<&Card>, rules: &ArchetypeRules) -> Result<Vec<Card>> {
        let completion = self.completion.ok_or_else(|| {
            ForgeError::Configuration("No text-completion service configured".to_string())
        })?;
        let commander = commander
            .ok_or_else(|| ForgeError::Generation("A commander is required".to_string()))?;

        info!(commander = %commander.name, archetype = rules.archetype.label(), "Generating decklist");
        let user_prompt = prompt::deck_prompt(commander, rules);
        let raw = completion.complete(
            prompt::SYSTEM_PROMPT,
            &user_prompt,
            config::GENERATION_MAX_TOKENS,
        )?;

        let cards = parse_card_list(&raw)?;
        let cards = filter_known_violations(cards, commander);

        if cards.len() < config::MIN_GENERATED_CARDS {
            return Err(ForgeError::InsufficientCards {
                found: cards.len(),
                required: config::MIN_GENERATED_CARDS,
            });
        }
        info!("Generated {} candidate cards", cards.len());
        Ok(cards)
    }
}

/// Parse model output into provisional cards.
///
/// Accepts an array of `{name, category}` objects or bare name strings, or an
/// object wrapping such an array under `cards`. Entries without a usable name
/// are skipped. An empty or non-list result is a parse failure.
pub fn parse_card_list(raw: &str) -> Result<Vec<Card>> {
    let value = match parse_model_json(raw, Shape::Array) {
        Ok((value, _)) => value,
        Err(err) => match parse_model_json(raw, Shape::Object) {
            Ok((Value::Object(mut map), _)) => map.remove("cards").ok_or(err)?,
            _ => return Err(err),
        },
    };

    let Value::Array(entries) = value else {
        return Err(ForgeError::parse_failure(raw));
    };
    if entries.is_empty() {
        return Err(ForgeError::parse_failure(raw));
    }

    let total = entries.len();
    let cards: Vec<Card> = entries.iter().filter_map(entry_to_card).collect();
    if cards.len() < total {
        debug!(skipped = total - cards.len(), "Skipped entries without a card name");
    }
    Ok(cards)
}

fn entry_to_card(entry: &Value) -> Option<Card> {
    let (name, category) = match entry {
        Value::String(name) => (name.as_str(), None),
        Value::Object(map) => (
            map.get("name")?.as_str()?,
            map.get("category")
                .and_then(Value::as_str)
                .map(Category::from_label),
        ),
        _ => return None,
    };
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(Card::provisional(name, category))
}

/// Drop banned cards and cards the offline table knows are off-color.
fn filter_known_violations(cards: Vec<Card>, commander: &Card) -> Vec<Card> {
    cards
        .into_iter()
        .filter(|card| {
            if is_card_banned(&card.name) {
                warn!("Dropping banned card {} from generated list", card.name);
                return false;
            }
            let check = validate_color_identity(&card.name, Some(&commander.color_identity));
            if !check.is_valid {
                warn!("Dropping off-color card {} from generated list", card.name);
                return false;
            }
            true
        })
        .collect()
}
