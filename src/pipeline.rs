//! The build state machine.
//!
//! `Generating -> Validating -> Replacing -> Re-validating -> Resolving ->
//! Assembling -> Complete`. Configuration, generation, parse and
//! insufficient-card failures abort the run with nothing committed. Every
//! other problem degrades to a [`BuildNotice`] and the run continues.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cards::{fallback_card, CardResolver, CardSource};
use crate::completion::CompletionService;
use crate::config::DECK_SIZE;
use crate::error::{ForgeError, Result};
use crate::generator::DeckGenerator;
use crate::legality::{
    check_land_count, copy_limit, is_commander_eligible, validate_card, validate_deck,
};
use crate::models::{ArchetypeRules, BuildNotice, BuildStage, BuiltDeck, Card, Category};
use crate::replacement::{apply_replacements, deck_keys, ReplacementGenerator};
use crate::scanner::ValidationScanner;

// ---------------------------------------------------------------------------
// CancellationFlag
// ---------------------------------------------------------------------------

/// Shared flag a caller sets to abandon a running build.
///
/// Checked at every stage boundary. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous cancellation so the flag can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// `Err(Cancelled)` if the flag is set when `stage` is about to start.
    pub fn check(&self, stage: BuildStage) -> Result<()> {
        if self.is_cancelled() {
            warn!("Build cancelled before {}", stage);
            return Err(ForgeError::Cancelled(stage.to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One build request over borrowed collaborators.
///
/// Holds no state between runs; every collection lives inside [`run`](Self::run).
pub struct Pipeline<'a> {
    completion: Option<&'a dyn CompletionService>,
    cards: &'a dyn CardSource,
    lookup_delay: Duration,
    cancel: &'a CancellationFlag,
}

/// Accumulates the human-readable log alongside structured notices.
#[derive(Default)]
struct BuildRecord {
    log: Vec<String>,
    notices: Vec<BuildNotice>,
}

impl BuildRecord {
    fn stage(&mut self, stage: BuildStage, detail: impl Into<String>) {
        let detail = detail.into();
        info!(stage = %stage, "{}", detail);
        self.log.push(format!("[{}] {}", stage, detail));
    }

    fn notice(&mut self, notice: BuildNotice) {
        warn!("{}", notice);
        self.log.push(format!("warning: {}", notice));
        self.notices.push(notice);
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        completion: Option<&'a dyn CompletionService>,
        cards: &'a dyn CardSource,
        cancel: &'a CancellationFlag,
    ) -> Self {
        Self {
            completion,
            cards,
            lookup_delay: crate::config::LOOKUP_DELAY,
            cancel,
        }
    }

    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    /// Run a complete build for `commander`.
    ///
    /// # Errors
    ///
    /// * [`ForgeError::Generation`] when the commander is missing or cannot
    ///   lead a deck.
    /// * Any error from [`DeckGenerator::generate`].
    /// * [`ForgeError::Cancelled`] when the cancellation flag is observed.
    pub fn run(&self, commander: Option<Card>, rules: &ArchetypeRules) -> Result<BuiltDeck> {
        let mut record = BuildRecord::default();

        self.cancel.check(BuildStage::Generating)?;
        let commander = self.prepare_commander(commander)?;
        record.stage(
            BuildStage::Generating,
            format!(
                "Generating a {} deck for {}",
                rules.archetype.label(),
                commander.name
            ),
        );
        let mut deck = DeckGenerator::new(self.completion).generate(Some(&commander), rules)?;
        record.stage(
            BuildStage::Generating,
            format!("Model proposed {} cards", deck.len()),
        );

        self.cancel.check(BuildStage::Validating)?;
        let report = ValidationScanner::new(self.completion).scan(&deck, Some(&commander));
        if let Some(reason) = report.fallback_reason.clone() {
            record.notice(BuildNotice::ValidationFallback { reason });
        }
        record.stage(
            BuildStage::Validating,
            format!(
                "{} violations ({} critical)",
                report.summary.total_violations, report.summary.critical
            ),
        );

        if !report.violations.is_empty() {
            self.cancel.check(BuildStage::Replacing)?;
            let generator =
                ReplacementGenerator::new(self.completion).with_card_source(self.cards);
            let (replacements, notices) =
                generator.propose_with_notices(&report.violations, &commander, &deck);
            for notice in notices {
                record.notice(notice);
            }

            let mut used = deck_keys(&deck);
            used.insert(commander.key());
            let substitutions = apply_replacements(&mut deck, &replacements, &mut used);
            for sub in &substitutions {
                record.stage(
                    BuildStage::Replacing,
                    format!("{} -> {}", sub.original, sub.replacement),
                );
            }

            self.cancel.check(BuildStage::Revalidating)?;
            let recheck = validate_deck(&deck, Some(&commander));
            record.stage(
                BuildStage::Revalidating,
                format!(
                    "{} violations remain after replacement",
                    recheck.violations.len()
                ),
            );
        }

        self.cancel.check(BuildStage::Resolving)?;
        let names: Vec<String> = deck.iter().map(|c| c.name.clone()).collect();
        let resolver = CardResolver::new(self.cards).with_delay(self.lookup_delay);
        let resolved = resolver.fetch_batch(&names);
        let mut gap_keys = std::collections::HashSet::new();
        for gap in resolved.gaps(&names) {
            if gap_keys.insert(crate::models::name_key(gap)) {
                record.notice(BuildNotice::LookupGap {
                    name: gap.to_string(),
                });
            }
        }
        record.stage(
            BuildStage::Resolving,
            format!("Resolved {} of {} cards", resolved.len(), names.len()),
        );

        self.cancel.check(BuildStage::Assembling)?;
        let (mut cards, lost) = self.assemble(&deck, &resolved, &commander, &mut record);
        self.backfill(&mut cards, &lost, &commander, &mut record);
        let padded = pad_with_basics(&mut cards, &commander);
        if padded > 0 {
            record.notice(BuildNotice::Padded { count: padded });
        }

        if let Some(budget) = rules.max_budget {
            let total: f64 = cards.iter().filter_map(|c| c.price_usd).sum();
            if total > budget {
                record.notice(BuildNotice::OverBudget { total, budget });
            } else {
                record.stage(
                    BuildStage::Assembling,
                    format!("Estimated cost ${:.2} of ${:.2} budget", total, budget),
                );
            }
        }
        if let Some(advisory) = check_land_count(&cards, rules) {
            record.stage(BuildStage::Assembling, advisory.reason);
        }

        let final_check = validate_deck(&cards, Some(&commander));
        if final_check.is_valid {
            record.stage(BuildStage::Complete, format!("{} cards, deck is legal", cards.len()));
        } else {
            for v in &final_check.violations {
                warn!("Unresolved violation in final deck: {} ({})", v.card, v.kind);
            }
            record.stage(
                BuildStage::Complete,
                format!(
                    "{} cards, {} violations remain",
                    cards.len(),
                    final_check.violations.len()
                ),
            );
        }

        Ok(BuiltDeck {
            cards,
            commander,
            build_log: record.log,
            notices: record.notices,
        })
    }

    /// Resolve a provisional commander and check that it can lead a deck.
    fn prepare_commander(&self, commander: Option<Card>) -> Result<Card> {
        let commander = commander
            .ok_or_else(|| ForgeError::Generation("A commander is required".to_string()))?;
        let commander = if commander.is_resolved {
            commander
        } else {
            match self.cards.lookup_by_name(&commander.name) {
                Ok(Some(card)) => card,
                Ok(None) => {
                    return Err(ForgeError::Generation(format!(
                        "Unknown commander: {}",
                        commander.name
                    )))
                }
                Err(e) => {
                    warn!("Could not resolve commander {}: {}", commander.name, e);
                    commander
                }
            }
        };
        if commander.is_resolved && !is_commander_eligible(&commander) {
            return Err(ForgeError::Generation(format!(
                "{} cannot be your commander",
                commander.name
            )));
        }
        Ok(commander)
    }

    /// Keep resolved cards that pass their own checks with real data, within
    /// copy limits, up to the deck size. Also returns the categories of the
    /// slots that were lost along the way.
    fn assemble(
        &self,
        deck: &[Card],
        resolved: &crate::cards::ResolvedCards,
        commander: &Card,
        record: &mut BuildRecord,
    ) -> (Vec<Card>, Vec<Category>) {
        let mut cards: Vec<Card> = Vec::with_capacity(DECK_SIZE);
        let mut lost = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        counts.insert(commander.key(), 1);

        for provisional in deck {
            if cards.len() >= DECK_SIZE {
                break;
            }
            let Some(found) = resolved.get(&provisional.name) else {
                lost.extend(provisional.category);
                continue;
            };
            let mut card = found.clone();
            if card.category.is_none() {
                card.category = provisional.category;
            }

            let check = validate_card(&card, Some(commander));
            if !check.is_valid {
                let reason = check
                    .violations
                    .iter()
                    .map(|v| v.reason.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                record.notice(BuildNotice::DroppedCard {
                    name: card.name.clone(),
                    reason,
                });
                lost.extend(card.category);
                continue;
            }

            let count = counts.entry(card.key()).or_insert(0);
            if let Some(limit) = copy_limit(&card) {
                if *count >= limit {
                    record.notice(BuildNotice::DroppedCard {
                        name: card.name.clone(),
                        reason: "duplicate copy".to_string(),
                    });
                    lost.extend(card.category);
                    continue;
                }
            }
            *count += 1;
            cards.push(card);
        }

        record.stage(
            BuildStage::Assembling,
            format!("Kept {} resolved cards", cards.len()),
        );
        (cards, lost)
    }

    /// Refill lost slots with searched cards of the same category. Whatever
    /// stays open is left for [`pad_with_basics`].
    fn backfill(
        &self,
        cards: &mut Vec<Card>,
        lost: &[Category],
        commander: &Card,
        record: &mut BuildRecord,
    ) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        counts.insert(commander.key(), 1);
        for card in cards.iter() {
            *counts.entry(card.key()).or_insert(0) += 1;
        }

        let mut pools: HashMap<Category, Vec<Card>> = HashMap::new();
        for &category in lost {
            if cards.len() >= DECK_SIZE {
                break;
            }
            let pool = pools
                .entry(category)
                .or_insert_with(|| self.search_pool(category, commander));
            let Some(i) = pool
                .iter()
                .position(|c| fits_slot(c, category, commander, &counts))
            else {
                continue;
            };

            let mut card = pool.remove(i);
            card.category.get_or_insert(category);
            *counts.entry(card.key()).or_insert(0) += 1;
            record.stage(
                BuildStage::Assembling,
                format!("Backfilled {} into a lost {} slot", card.name, category),
            );
            cards.push(card);
        }
    }

    fn search_pool(&self, category: Category, commander: &Card) -> Vec<Card> {
        match self
            .cards
            .search_category(category, &commander.color_identity)
        {
            Ok(found) => found,
            Err(e) => {
                warn!("Backfill search for {} failed: {}", category, e);
                Vec::new()
            }
        }
    }
}

/// Nonbasic, legal under `commander`, within copy limits, and a land when the
/// slot is a land slot.
fn fits_slot(
    card: &Card,
    category: Category,
    commander: &Card,
    counts: &HashMap<String, usize>,
) -> bool {
    if card.is_basic_land() || (category == Category::Lands && !card.is_land()) {
        return false;
    }
    let held = counts.get(&card.key()).copied().unwrap_or(0);
    if copy_limit(card).is_some_and(|limit| held >= limit) {
        return false;
    }
    validate_card(card, Some(commander)).is_valid
}

/// Fill `cards` up to the deck size with basic lands split across the
/// commander's colors, or Wastes for a colorless commander. Returns how many
/// were added.
pub fn pad_with_basics(cards: &mut Vec<Card>, commander: &Card) -> usize {
    let missing = DECK_SIZE.saturating_sub(cards.len());
    if missing == 0 {
        return 0;
    }
    let basics: Vec<&str> = if commander.color_identity.is_empty() {
        vec!["Wastes"]
    } else {
        commander
            .color_identity
            .iter()
            .map(|c| c.basic_land())
            .collect()
    };
    for i in 0..missing {
        let name = basics[i % basics.len()];
        let card = fallback_card(name)
            .unwrap_or_else(|| Card::provisional(name, Some(Category::Lands)));
        cards.push(card);
    }
    missing
}
