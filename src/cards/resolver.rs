//! Turns card names into resolved [`Card`] records.
//!
//! Batch first, one name at a time on batch failure, synthetic data as the
//! last resort. Nothing here returns an error: a name that cannot be
//! resolved is simply absent from the result.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cards::fallback::fallback_card;
use crate::cards::source::CardSource;
use crate::config;
use crate::models::{name_key, Card};

/// Resolved cards keyed by [`name_key`] of the requested name.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCards {
    cards: HashMap<String, Card>,
}

impl ResolvedCards {
    pub fn get(&self, name: &str) -> Option<&Card> {
        self.cards.get(&name_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(&name_key(name))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn insert(&mut self, requested: &str, card: Card) {
        self.cards.insert(name_key(requested), card);
    }

    /// Names from `requested` that did not resolve.
    pub fn gaps<'n>(&self, requested: &'n [String]) -> Vec<&'n str> {
        requested
            .iter()
            .filter(|n| !self.contains(n))
            .map(String::as_str)
            .collect()
    }
}

pub struct CardResolver<'a> {
    source: &'a dyn CardSource,
    delay: Duration,
}

impl<'a> CardResolver<'a> {
    pub fn new(source: &'a dyn CardSource) -> Self {
        Self {
            source,
            delay: config::LOOKUP_DELAY,
        }
    }

    /// Spacing between single-card requests on the fallback path.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Resolve `names` in chunks of the source's batch limit.
    ///
    /// A chunk whose request fails is retried name by name. Names a
    /// successful chunk did not return are also retried individually so the
    /// synthetic table gets a chance.
    pub fn fetch_batch(&self, names: &[String]) -> ResolvedCards {
        let mut resolved = ResolvedCards::default();
        let names = dedup_names(names);
        let limit = self.source.batch_limit().max(1);

        for chunk in names.chunks(limit) {
            match self.source.lookup_batch(chunk) {
                Ok(cards) => {
                    let mut by_key: HashMap<String, Card> = HashMap::new();
                    for card in cards {
                        for key in lookup_keys(&card.name) {
                            by_key.entry(key).or_insert_with(|| card.clone());
                        }
                    }
                    let mut missed = Vec::new();
                    for name in chunk {
                        match by_key.get(&name_key(name)) {
                            Some(card) => resolved.insert(name, card.clone()),
                            None => missed.push(name.clone()),
                        }
                    }
                    debug!(
                        requested = chunk.len(),
                        missed = missed.len(),
                        "Batch lookup complete"
                    );
                    if !missed.is_empty() {
                        self.fill_individually(&missed, &mut resolved);
                    }
                }
                Err(e) => {
                    warn!(
                        "Batch lookup of {} cards failed, falling back to single lookups: {}",
                        chunk.len(),
                        e
                    );
                    self.fill_individually(chunk, &mut resolved);
                }
            }
        }

        info!("Resolved {} of {} card names", resolved.len(), names.len());
        resolved
    }

    /// Resolve `names` one request at a time, spaced by the configured delay.
    pub fn fetch_individually(&self, names: &[String]) -> ResolvedCards {
        let mut resolved = ResolvedCards::default();
        self.fill_individually(&dedup_names(names), &mut resolved);
        resolved
    }

    fn fill_individually(&self, names: &[String], resolved: &mut ResolvedCards) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            let found = match self.source.lookup_by_name(name) {
                Ok(card) => card,
                Err(e) => {
                    warn!("Lookup for {} failed: {}", name, e);
                    None
                }
            };
            match found.or_else(|| fallback_card(name)) {
                Some(card) => {
                    if card.is_fallback {
                        debug!(name = %name, "Using synthetic card data");
                    }
                    resolved.insert(name, card);
                }
                None => warn!("No card data for {}; leaving slot empty", name),
            }
        }
    }
}

/// The full name plus, for multi-face cards, the front face name.
fn lookup_keys(name: &str) -> Vec<String> {
    let mut keys = vec![name_key(name)];
    if let Some((front, _)) = name.split_once(" // ") {
        keys.push(name_key(front));
    }
    keys
}

fn dedup_names(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .filter(|n| !n.trim().is_empty() && seen.insert(name_key(n)))
        .cloned()
        .collect()
}
