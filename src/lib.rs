//! Commander deck building for Magic: The Gathering.
//!
//! A deterministic legality engine (ban list, color identity, singleton and
//! deck-size rules) wrapped around a model-assisted pipeline: a language
//! model proposes a decklist, a scanner double-checks it, flagged cards are
//! replaced without introducing duplicates, and the result is resolved
//! against real card data and assembled into exactly 99 cards.
//!
//! # Quick start
//!
//! ```no_run
//! use commander_forge::{ArchetypeRules, DeckForge};
//!
//! let forge = DeckForge::builder().api_key_from_env().build().unwrap();
//!
//! let commander = forge.resolve_commander("Atraxa, Praetors' Voice").unwrap();
//! let deck = forge.build(Some(commander), &ArchetypeRules::default()).unwrap();
//! for line in &deck.build_log {
//!     println!("{}", line);
//! }
//! ```
//!
//! The rules engine works without any network access:
//!
//! ```
//! use commander_forge::legality::is_card_banned;
//! assert!(is_card_banned("Mana Crypt"));
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod cards;
pub mod completion;
pub mod config;
pub mod error;
pub mod generator;
pub mod legality;
pub mod models;
pub mod pipeline;
pub mod replacement;
pub mod scanner;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncDeckForge;
pub use cards::{CardResolver, CardSource, ScryfallClient};
pub use completion::{CompletionService, OpenAiClient};
pub use error::{ForgeError, Result};
pub use models::{
    Archetype, ArchetypeRules, BuildNotice, BuildStage, BuiltDeck, Card, Category, Color,
    DeckValidation, Replacement, Violation, ViolationType,
};
pub use pipeline::CancellationFlag;
pub use scanner::ScanReport;
pub use store::MtgjsonStore;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::generator::DeckGenerator;
use crate::pipeline::Pipeline;
use crate::replacement::ReplacementGenerator;
use crate::scanner::ValidationScanner;

// ---------------------------------------------------------------------------
// DeckForgeBuilder
// ---------------------------------------------------------------------------

/// Builder for [`DeckForge`].
///
/// Obtain one with [`DeckForge::builder()`]. Explicit collaborators win over
/// derived ones: a `completion_service` over an API key, a `card_source` over
/// an offline store, and an offline store over the Scryfall API.
pub struct DeckForgeBuilder {
    api_key: Option<String>,
    key_from_env: bool,
    model: String,
    timeout: Duration,
    lookup_delay: Duration,
    card_source: Option<Box<dyn CardSource>>,
    completion: Option<Box<dyn CompletionService>>,
    store_dir: Option<PathBuf>,
    offline: bool,
}

impl Default for DeckForgeBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            key_from_env: false,
            model: config::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
            lookup_delay: config::LOOKUP_DELAY,
            card_source: None,
            completion: None,
            store_dir: None,
            offline: false,
        }
    }
}

impl DeckForgeBuilder {
    /// API key for the OpenAI chat-completions endpoint.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Read the API key from `OPENAI_API_KEY` at build time if none was set.
    pub fn api_key_from_env(mut self) -> Self {
        self.key_from_env = true;
        self
    }

    /// Chat model name. Defaults to [`config::DEFAULT_MODEL`].
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// HTTP timeout for every outbound request. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spacing between single-card lookups on the fallback path.
    pub fn lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    pub fn card_source(mut self, source: impl CardSource + 'static) -> Self {
        self.card_source = Some(Box::new(source));
        self
    }

    pub fn completion_service(mut self, service: impl CompletionService + 'static) -> Self {
        self.completion = Some(Box::new(service));
        self
    }

    /// Resolve cards from MTGJSON data cached under `cache_dir` instead of
    /// the Scryfall API.
    pub fn offline_store<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.store_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// With an offline store, never download; use cached files only.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Build the forge.
    ///
    /// A missing API key is not an error here: generation will fail with
    /// [`ForgeError::Configuration`] and scanning and replacement fall back
    /// to the rules engine.
    pub fn build(self) -> Result<DeckForge> {
        let completion: Option<Box<dyn CompletionService>> = match self.completion {
            Some(service) => Some(service),
            None => {
                let key = self.api_key.or_else(|| {
                    if self.key_from_env {
                        std::env::var(config::API_KEY_ENV).ok()
                    } else {
                        None
                    }
                });
                match key.filter(|k| !k.trim().is_empty()) {
                    Some(key) => Some(Box::new(OpenAiClient::new(
                        key,
                        self.model.clone(),
                        self.timeout,
                    )?)),
                    None => {
                        debug!("No API key configured; model-assisted stages are disabled");
                        None
                    }
                }
            }
        };

        let cards: Box<dyn CardSource> = match (self.card_source, self.store_dir) {
            (Some(source), _) => source,
            (None, Some(dir)) => Box::new(MtgjsonStore::open(Some(dir), self.offline, self.timeout)?),
            (None, None) => Box::new(ScryfallClient::new(self.timeout)?),
        };

        Ok(DeckForge {
            completion,
            cards,
            lookup_delay: self.lookup_delay,
            model: self.model,
            cancel: CancellationFlag::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// DeckForge
// ---------------------------------------------------------------------------

/// Entry point tying the rules engine, card data and completion service
/// together.
///
/// Every stage is also exposed on its own so callers can run validation or
/// replacement without a full build.
pub struct DeckForge {
    completion: Option<Box<dyn CompletionService>>,
    cards: Box<dyn CardSource>,
    lookup_delay: Duration,
    model: String,
    cancel: CancellationFlag,
}

impl DeckForge {
    pub fn builder() -> DeckForgeBuilder {
        DeckForgeBuilder::default()
    }

    fn completion(&self) -> Option<&dyn CompletionService> {
        self.completion.as_deref()
    }

    pub fn card_source(&self) -> &dyn CardSource {
        self.cards.as_ref()
    }

    /// Whether a completion service is configured.
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Flag shared with running builds. Setting it aborts the current build
    /// at the next stage boundary.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    // -- Pipeline ----------------------------------------------------------

    /// Run the full pipeline and return a 99-card deck.
    ///
    /// A provisional commander is resolved through the card source first.
    /// Clears any earlier cancellation before starting.
    pub fn build(&self, commander: Option<Card>, rules: &ArchetypeRules) -> Result<BuiltDeck> {
        self.cancel.reset();
        Pipeline::new(self.completion(), self.cards.as_ref(), &self.cancel)
            .with_lookup_delay(self.lookup_delay)
            .run(commander, rules)
    }

    /// Look up a commander by name.
    pub fn resolve_commander(&self, name: &str) -> Result<Card> {
        self.cards
            .lookup_by_name(name)?
            .ok_or_else(|| ForgeError::NotFound(format!("No card named {}", name)))
    }

    // -- Individual stages -------------------------------------------------

    pub fn generate(&self, commander: Option<&Card>, rules: &ArchetypeRules) -> Result<Vec<Card>> {
        DeckGenerator::new(self.completion()).generate(commander, rules)
    }

    pub fn scan(&self, cards: &[Card], commander: Option<&Card>) -> ScanReport {
        ValidationScanner::new(self.completion()).scan(cards, commander)
    }

    pub fn validate(&self, cards: &[Card], commander: Option<&Card>) -> DeckValidation {
        legality::validate_deck(cards, commander)
    }

    pub fn propose_replacements(
        &self,
        violations: &[Violation],
        commander: &Card,
        current_deck: &[Card],
    ) -> Vec<Replacement> {
        ReplacementGenerator::new(self.completion())
            .with_card_source(self.cards.as_ref())
            .propose(violations, commander, current_deck)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for DeckForge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = if self.completion.is_some() {
            self.model.as_str()
        } else {
            "none"
        };
        write!(
            f,
            "DeckForge(model={}, batch_limit={}, lookup_delay={}ms)",
            model,
            self.cards.batch_limit(),
            self.lookup_delay.as_millis()
        )
    }
}
