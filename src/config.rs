use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// -- Card data API -----------------------------------------------------------

pub const SCRYFALL_API: &str = "https://api.scryfall.com";

/// Maximum identifiers accepted by one `/cards/collection` request.
pub const BATCH_LIMIT: usize = 75;

/// Spacing between single-card lookups when the batch path has failed.
pub const LOOKUP_DELAY: Duration = Duration::from_millis(100);

pub const USER_AGENT: &str = concat!("commander-forge/", env!("CARGO_PKG_VERSION"));

// -- Text completion ---------------------------------------------------------

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const GENERATION_MAX_TOKENS: u32 = 4000;
pub const SCAN_MAX_TOKENS: u32 = 1500;
pub const REPLACEMENT_MAX_TOKENS: u32 = 1500;

// -- Deck rules ---------------------------------------------------------------

/// Non-commander slots in a finished deck.
pub const DECK_SIZE: usize = 99;

/// Fewest surviving generated cards that still count as a usable deck.
pub const MIN_GENERATED_CARDS: usize = 50;

/// Cards summarized in the scanner prompt.
pub const SCAN_CARD_LIMIT: usize = 50;

/// Characters of raw model output kept in parse diagnostics.
pub const PARSE_PREVIEW_CHARS: usize = 200;

// -- Offline store (MTGJSON) -------------------------------------------------

pub const CDN_BASE: &str = "https://mtgjson.com/api/v5";
pub const META_URL: &str = "https://mtgjson.com/api/v5/Meta.json";

pub fn parquet_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("cards", "parquet/cards.parquet"),
        ("card_legalities", "parquet/cardLegalities.parquet"),
    ])
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("commander-forge")
    } else {
        PathBuf::from(".commander-forge-cache")
    }
}
