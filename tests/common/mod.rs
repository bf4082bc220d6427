//! Shared fixtures for the integration tests.
//!
//! Provides card builders, an in-memory [`CardSource`], a scripted
//! [`CompletionService`] and `setup_sample_store()`, which loads a few
//! MTGJSON-shaped rows into DuckDB through NDJSON temp files.

#![allow(dead_code)]

use commander_forge::models::{parse_colors, Category, Legalities, Legality};
use commander_forge::store::{CacheManager, Connection, MtgjsonStore};
use commander_forge::{Card, CardSource, CompletionService, ForgeError, Result};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Card builders
// ---------------------------------------------------------------------------

/// A resolved, Commander-legal card.
pub fn card(name: &str, colors: &[&str], type_line: &str) -> Card {
    let mut c = Card::provisional(name, None);
    c.color_identity = parse_colors(colors);
    c.type_line = type_line.to_string();
    c.legalities = Legalities::commander(Legality::Legal);
    c.is_resolved = true;
    c
}

pub fn commander(name: &str, colors: &[&str]) -> Card {
    card(name, colors, "Legendary Creature — Test")
}

pub fn atraxa() -> Card {
    commander("Atraxa, Praetors' Voice", &["W", "U", "B", "G"])
}

pub fn krenko() -> Card {
    commander("Krenko, Mob Boss", &["R"])
}

/// `n` distinct colorless artifacts nobody has heard of.
pub fn filler_cards(n: usize) -> Vec<Card> {
    (1..=n)
        .map(|i| card(&format!("Filler Artifact {}", i), &[], "Artifact"))
        .collect()
}

/// Provisional copies of `cards`, as the generator would return them.
pub fn provisional(cards: &[Card]) -> Vec<Card> {
    cards
        .iter()
        .map(|c| Card::provisional(c.name.clone(), c.category.or(Some(Category::Utility))))
        .collect()
}

/// A model response listing `names` as `{name, category}` objects.
pub fn deck_json(names: &[String]) -> String {
    let entries: Vec<serde_json::Value> = names
        .iter()
        .map(|n| serde_json::json!({ "name": n, "category": "Utility" }))
        .collect();
    serde_json::to_string(&entries).unwrap()
}

pub fn names(cards: &[Card]) -> Vec<String> {
    cards.iter().map(|c| c.name.clone()).collect()
}

// ---------------------------------------------------------------------------
// FakeCardSource
// ---------------------------------------------------------------------------

/// In-memory card data with switchable failure modes and call counters.
#[derive(Default)]
pub struct FakeCardSource {
    cards: HashMap<String, Card>,
    pub fail_batch: bool,
    pub fail_single: bool,
    pub fail_search: bool,
    pub batch_limit: Option<usize>,
    pub batch_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl FakeCardSource {
    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut source = Self::default();
        for c in cards {
            source.add(c);
        }
        source
    }

    pub fn add(&mut self, card: Card) {
        self.cards.insert(card.key(), card);
    }

    pub fn failing() -> Self {
        Self {
            fail_batch: true,
            fail_single: true,
            ..Self::default()
        }
    }

    /// Exact name, or the front face of a multi-face card.
    fn find(&self, name: &str) -> Option<Card> {
        let key = name.trim().to_lowercase();
        self.cards.get(&key).cloned().or_else(|| {
            let prefix = format!("{} // ", key);
            self.cards
                .iter()
                .find(|(k, _)| k.starts_with(&prefix))
                .map(|(_, c)| c.clone())
        })
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

impl CardSource for FakeCardSource {
    fn lookup_by_name(&self, name: &str) -> Result<Option<Card>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_single {
            return Err(ForgeError::NotFound("card service unavailable".to_string()));
        }
        Ok(self.find(name))
    }

    fn lookup_batch(&self, names: &[String]) -> Result<Vec<Card>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.batch_limit {
            assert!(names.len() <= limit, "batch of {} over limit {}", names.len(), limit);
        }
        if self.fail_batch {
            return Err(ForgeError::NotFound("batch endpoint unavailable".to_string()));
        }
        Ok(names
            .iter()
            .filter_map(|n| self.find(n))
            .collect())
    }

    /// Substring match over name, type line and rules text, like the store.
    fn search_by_query(&self, query: &str) -> Result<Vec<Card>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(ForgeError::NotFound("card search unavailable".to_string()));
        }
        let q = query.to_lowercase();
        let mut found: Vec<Card> = self
            .cards
            .values()
            .filter(|c| {
                c.key().contains(&q)
                    || c.type_line.to_lowercase().contains(&q)
                    || c.oracle_contains(&q)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn batch_limit(&self) -> usize {
        self.batch_limit.unwrap_or(75)
    }
}

// ---------------------------------------------------------------------------
// ScriptedCompletion
// ---------------------------------------------------------------------------

/// Replays canned responses in order and records every user prompt.
/// `Err` entries become generation errors; an exhausted script errors too.
#[derive(Default)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying<S: AsRef<str>>(responses: &[S]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.as_ref().to_string())).collect())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl CompletionService for ScriptedCompletion {
    fn complete(&self, _system_prompt: &str, user_prompt: &str, _max_tokens: u32) -> Result<String> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(ForgeError::Generation(msg)),
            None => Err(ForgeError::Generation("script exhausted".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample MTGJSON store
// ---------------------------------------------------------------------------

/// A [`MtgjsonStore`] over a temporary offline cache with sample `cards` and
/// `card_legalities` tables.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn setup_sample_store() -> (MtgjsonStore, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let cache = CacheManager::new(
        Some(tmp_dir.path().to_path_buf()),
        true,
        Duration::from_secs(30),
    )
    .unwrap();
    let conn = Connection::new(cache).unwrap();

    register_cards(&conn);
    register_card_legalities(&conn);

    (MtgjsonStore::from_connection(conn), tmp_dir)
}

fn register_cards(conn: &Connection) {
    let cards = vec![
        serde_json::json!({
            "uuid": "card-uuid-001",
            "name": "Lightning Bolt",
            "faceName": null,
            "colorIdentity": "R",
            "manaValue": 1.0,
            "manaCost": "{R}",
            "type": "Instant",
            "text": "Lightning Bolt deals 3 damage to any target."
        }),
        serde_json::json!({
            "uuid": "card-uuid-002",
            "name": "Lightning Bolt",
            "faceName": null,
            "colorIdentity": "R",
            "manaValue": 1.0,
            "manaCost": "{R}",
            "type": "Instant",
            "text": "Lightning Bolt deals 3 damage to any target."
        }),
        serde_json::json!({
            "uuid": "card-uuid-003",
            "name": "Fire // Ice",
            "faceName": "Fire",
            "colorIdentity": "R, U",
            "manaValue": 4.0,
            "manaCost": "{1}{R}",
            "type": "Instant // Instant",
            "text": "Fire deals 2 damage divided as you choose among one or two targets."
        }),
        serde_json::json!({
            "uuid": "card-uuid-004",
            "name": "Mana Crypt",
            "faceName": null,
            "colorIdentity": "",
            "manaValue": 0.0,
            "manaCost": "{0}",
            "type": "Artifact",
            "text": "At the beginning of your upkeep, flip a coin."
        }),
        serde_json::json!({
            "uuid": "card-uuid-005",
            "name": "Krenko, Mob Boss",
            "faceName": null,
            "colorIdentity": "R",
            "manaValue": 4.0,
            "manaCost": "{2}{R}{R}",
            "type": "Legendary Creature — Goblin Warrior",
            "text": "{T}: Create X 1/1 red Goblin creature tokens, where X is the number of Goblins you control."
        }),
        serde_json::json!({
            "uuid": "card-uuid-006",
            "name": "Command Tower",
            "faceName": null,
            "colorIdentity": "",
            "manaValue": 0.0,
            "manaCost": null,
            "type": "Land",
            "text": "{T}: Add one mana of any color in your commander's color identity."
        }),
    ];
    write_ndjson_and_register(conn, "cards", &cards);
}

fn register_card_legalities(conn: &Connection) {
    let rows = vec![
        serde_json::json!({ "uuid": "card-uuid-001", "commander": "Legal" }),
        serde_json::json!({ "uuid": "card-uuid-002", "commander": "Legal" }),
        serde_json::json!({ "uuid": "card-uuid-003", "commander": "Legal" }),
        serde_json::json!({ "uuid": "card-uuid-004", "commander": "Banned" }),
        serde_json::json!({ "uuid": "card-uuid-005", "commander": "Legal" }),
        serde_json::json!({ "uuid": "card-uuid-006", "commander": "Legal" }),
    ];
    write_ndjson_and_register(conn, "card_legalities", &rows);
}

fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
    // DuckDB has copied the rows into memory; the temp file can go.
}
