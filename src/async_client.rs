//! Async wrapper around [`DeckForge`] for Tokio applications.
//!
//! Builds run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]; the pipeline itself stays synchronous.
//!
//! # Example
//!
//! ```no_run
//! use commander_forge::{ArchetypeRules, AsyncDeckForge, DeckForge};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let forge = AsyncDeckForge::new(DeckForge::builder().api_key_from_env().build().unwrap());
//!
//!     let commander = forge.resolve_commander("Krenko, Mob Boss").await.unwrap();
//!     let deck = forge.build(Some(commander), ArchetypeRules::default()).await.unwrap();
//!     println!("{} cards", deck.cards.len());
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::error::{ForgeError, Result};
use crate::models::{ArchetypeRules, BuiltDeck, Card};
use crate::pipeline::CancellationFlag;
use crate::DeckForge;

/// Async handle to a [`DeckForge`].
///
/// Cloning is cheap; clones share the same forge. Calls are serialized by a
/// [`Mutex`] because card sources need not be `Sync`.
#[derive(Clone)]
pub struct AsyncDeckForge {
    inner: Arc<Mutex<DeckForge>>,
    cancel: CancellationFlag,
}

impl AsyncDeckForge {
    pub fn new(forge: DeckForge) -> Self {
        let cancel = forge.cancellation_flag();
        Self {
            inner: Arc::new(Mutex::new(forge)),
            cancel,
        }
    }

    /// Run a synchronous forge operation on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DeckForge) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let forge = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = forge
                .lock()
                .map_err(|_| ForgeError::InvalidArgument("DeckForge lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| ForgeError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn build(&self, commander: Option<Card>, rules: ArchetypeRules) -> Result<BuiltDeck> {
        self.run(move |forge| forge.build(commander, &rules)).await
    }

    pub async fn resolve_commander(&self, name: &str) -> Result<Card> {
        let name = name.to_string();
        self.run(move |forge| forge.resolve_commander(&name)).await
    }

    /// Abort the build currently running, if any, at its next stage
    /// boundary. Does not wait for the lock.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
