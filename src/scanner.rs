//! Second-opinion validation of a candidate list.
//!
//! The rules engine runs first. Its critical findings are trusted without
//! consulting the model. Otherwise the model looks for subtler problems and
//! its findings are merged over the deterministic ones. Scanning never fails:
//! any model problem falls back to the deterministic result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use tracing::{debug, info, warn};

use crate::completion::CompletionService;
use crate::config;
use crate::error::Result;
use crate::generator::{parse_model_json, Shape};
use crate::legality::{self, copy_limit, BANNED_CARDS};
use crate::models::{
    format_identity, is_within_identity, name_key, Card, Color, Severity, Violation, ViolationType,
};

const SCAN_SYSTEM_PROMPT: &str = "You are a strict Magic: The Gathering Commander rules judge. \
You report only real rule violations and answer with JSON only.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub cards_scanned: usize,
    pub total_violations: usize,
    pub critical: usize,
    pub moderate: usize,
    pub minor: usize,
    /// Whether the model contributed to this result.
    pub ai_checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub violations: Vec<Violation>,
    pub summary: ScanSummary,
    /// Set when the model pass was wanted but unavailable.
    pub fallback_reason: Option<String>,
}

pub struct ValidationScanner<'a> {
    completion: Option<&'a dyn CompletionService>,
}

impl<'a> ValidationScanner<'a> {
    pub fn new(completion: Option<&'a dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub fn scan(&self, cards: &[Card], commander: Option<&Card>) -> ScanReport {
        let deterministic = legality::validate_deck(cards, commander).violations;

        if deterministic.iter().any(Violation::is_critical) {
            info!(
                "Rules engine found {} violations, skipping AI scan",
                deterministic.len()
            );
            return report(cards.len(), deterministic, false, None);
        }

        let (Some(completion), Some(commander)) = (self.completion, commander) else {
            let reason = "no text-completion service configured".to_string();
            debug!("AI scan skipped: {}", reason);
            return report(cards.len(), deterministic, false, Some(reason));
        };

        match self.ai_scan(completion, cards, commander) {
            Ok(found) => {
                info!("AI scan reported {} violations", found.len());
                // The rules engine only reports critical findings, so reaching
                // here means `deterministic` is empty and the merge reduces to
                // de-duplicating the model's entries.
                let merged = merge_violations(deterministic, found);
                report(cards.len(), merged, true, None)
            }
            Err(e) => {
                warn!("AI scan failed, using rules engine results only: {}", e);
                report(cards.len(), deterministic, false, Some(e.to_string()))
            }
        }
    }

    fn ai_scan(
        &self,
        completion: &dyn CompletionService,
        cards: &[Card],
        commander: &Card,
    ) -> Result<Vec<Violation>> {
        let prompt = scan_prompt(cards, commander);
        let raw = completion.complete(SCAN_SYSTEM_PROMPT, &prompt, config::SCAN_MAX_TOKENS)?;
        let entries = violation_entries(&raw)?;

        let in_deck: HashMap<String, &Card> = cards.iter().map(|c| (c.key(), c)).collect();
        Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<Violation>(entry).ok())
            .filter(|v| match in_deck.get(&name_key(&v.card)) {
                // Hallucinated cards and carve-outs are ignored.
                None => false,
                Some(card) if card.is_basic_land() => false,
                Some(card) => {
                    !(v.kind == ViolationType::SingletonViolation && copy_limit(card).is_none())
                }
            })
            .collect())
    }
}

fn violation_entries(raw: &str) -> Result<Vec<Value>> {
    match parse_model_json(raw, Shape::Object) {
        Ok((Value::Object(mut map), _)) => match map.remove("violations") {
            Some(Value::Array(list)) => Ok(list),
            _ => Ok(Vec::new()),
        },
        _ => {
            let (value, _) = parse_model_json(raw, Shape::Array)?;
            Ok(value.as_array().cloned().unwrap_or_default())
        }
    }
}

fn scan_prompt(cards: &[Card], commander: &Card) -> String {
    let identity = &commander.color_identity;
    let mut p = String::new();
    let _ = writeln!(
        p,
        "Commander: {} (color identity: {})",
        commander.name,
        format_identity(identity)
    );
    let _ = writeln!(p);
    let _ = writeln!(
        p,
        "Check these cards (first {} of {}):",
        cards.len().min(config::SCAN_CARD_LIMIT),
        cards.len()
    );
    for card in cards.iter().take(config::SCAN_CARD_LIMIT) {
        match card.category {
            Some(category) => {
                let _ = writeln!(p, "- {} ({})", card.name, category);
            }
            None => {
                let _ = writeln!(p, "- {}", card.name);
            }
        }
    }
    let _ = writeln!(p);

    let problem_cards = known_problem_cards(identity);
    let _ = writeln!(p, "Known problem cards to watch for: {}", problem_cards.join(", "));
    let _ = writeln!(p);
    let _ = writeln!(p, "Flag banned cards, cards outside the color identity and duplicates.");
    let _ = writeln!(
        p,
        "Do NOT flag basic lands, or cards that say \"A deck can have any number of cards named\" this card."
    );
    let _ = writeln!(
        p,
        "Respond with JSON only: {{\"violations\": [{{\"card\": \"Name\", \"type\": \
         \"banned_card|color_identity|singleton_violation\", \"severity\": \
         \"critical|moderate|minor\", \"reason\": \"...\", \"suggestedReplacement\": \"Name\"}}]}}. \
         Use an empty list if the deck is legal."
    );
    p
}

/// Banned cards plus table-listed cards that fall outside `identity`.
fn known_problem_cards(identity: &[Color]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BANNED_CARDS.to_vec();
    names.extend(
        legality::color_identity::KNOWN_COLOR_IDENTITIES
            .iter()
            .filter(|(_, colors)| !is_within_identity(colors, identity))
            .map(|(name, _)| *name),
    );
    names
}

/// Merge model findings over deterministic ones, keyed by card and type.
///
/// For a shared key the model's entry replaces the first deterministic entry;
/// every other deterministic entry is kept. Model-only keys are appended once.
/// The type is part of the key so a model finding never displaces a
/// deterministic finding of a different kind for the same card.
pub fn merge_violations(deterministic: Vec<Violation>, ai: Vec<Violation>) -> Vec<Violation> {
    let mut ai_by_key: HashMap<(String, ViolationType), Violation> = HashMap::new();
    let mut ai_order: Vec<(String, ViolationType)> = Vec::new();
    for v in ai {
        let key = (name_key(&v.card), v.kind);
        if !ai_by_key.contains_key(&key) {
            ai_order.push(key.clone());
            ai_by_key.insert(key, v);
        }
    }

    let mut merged = Vec::with_capacity(deterministic.len() + ai_order.len());
    let mut covered: HashSet<(String, ViolationType)> = HashSet::new();
    for v in deterministic {
        let key = (name_key(&v.card), v.kind);
        if covered.insert(key.clone()) {
            if let Some(ai_v) = ai_by_key.remove(&key) {
                merged.push(ai_v);
                continue;
            }
        }
        merged.push(v);
    }
    for key in ai_order {
        if let Some(v) = ai_by_key.remove(&key) {
            merged.push(v);
        }
    }
    merged
}

fn report(
    cards_scanned: usize,
    violations: Vec<Violation>,
    ai_checked: bool,
    fallback_reason: Option<String>,
) -> ScanReport {
    let count = |s: Severity| violations.iter().filter(|v| v.severity == s).count();
    let summary = ScanSummary {
        cards_scanned,
        total_violations: violations.len(),
        critical: count(Severity::Critical),
        moderate: count(Severity::Moderate),
        minor: count(Severity::Minor),
        ai_checked,
    };
    ScanReport {
        violations,
        summary,
        fallback_reason,
    }
}
