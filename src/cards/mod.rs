//! Card data resolution: the [`CardSource`] seam, the Scryfall
//! implementation, synthetic fallbacks and the batching resolver.

pub mod fallback;
pub mod resolver;
pub mod scryfall;
pub mod source;

pub use fallback::fallback_card;
pub use resolver::{CardResolver, ResolvedCards};
pub use scryfall::ScryfallClient;
pub use source::CardSource;
