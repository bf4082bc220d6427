use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::cards::CardSource;
use crate::error::Result;
use crate::models::{name_key, parse_colors, Card, Category, Legalities, Legality};
use crate::store::cache::CacheManager;
use crate::store::connection::{Connection, Row};
use crate::store::sql_builder::SqlBuilder;

const SELECT_COLUMNS: &[&str] = &[
    "c.name",
    "c.faceName",
    "c.colorIdentity",
    "c.type",
    "c.manaValue",
    "c.manaCost",
    "c.text",
    "l.commander",
];

const SEARCH_LIMIT: usize = 50;

/// [`CardSource`] over MTGJSON data queried locally with DuckDB.
///
/// MTGJSON has one row per printing and per face; the first row for a name
/// wins. Prices are not available offline.
pub struct MtgjsonStore {
    conn: Connection,
}

impl MtgjsonStore {
    /// Open the store over `cache_dir` (or the platform default).
    ///
    /// Nothing is downloaded until the first lookup.
    pub fn open(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let cache = CacheManager::new(cache_dir, offline, timeout)?;
        Ok(Self::from_connection(Connection::new(cache)?))
    }

    /// Wrap an existing connection, e.g. one with tables already loaded.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Refresh cached files if MTGJSON published newer data. Returns whether
    /// anything was stale.
    pub fn refresh(&self) -> Result<bool> {
        let stale = self.conn.cache.borrow_mut().is_stale()?;
        if stale {
            self.conn.cache.borrow().clear()?;
            self.conn.reset_views();
            debug!("MTGJSON cache was stale; views reset");
        }
        Ok(stale)
    }

    fn query(&self, builder: &mut SqlBuilder) -> Result<Vec<Card>> {
        self.conn.ensure_views(&["cards", "card_legalities"])?;
        let (sql, params) = builder
            .select(SELECT_COLUMNS)
            .join("LEFT JOIN card_legalities l ON c.uuid = l.uuid")
            .order_by(&["c.name"])
            .build();
        let rows = self.conn.execute(&sql, &params)?;

        let mut seen = std::collections::HashSet::new();
        Ok(rows
            .iter()
            .filter_map(row_to_card)
            .filter(|card| seen.insert(card.key()))
            .collect())
    }
}

impl CardSource for MtgjsonStore {
    fn lookup_by_name(&self, name: &str) -> Result<Option<Card>> {
        let key = name_key(name);
        let mut builder = SqlBuilder::new("cards c");
        builder.where_in_lower(&["c.name", "c.faceName"], &[name]);
        let cards = self.query(&mut builder)?;
        // Prefer an exact full-name match over a face match.
        let exact = cards.iter().position(|c| c.key() == key);
        Ok(match exact {
            Some(i) => cards.into_iter().nth(i),
            None => cards.into_iter().next(),
        })
    }

    fn lookup_batch(&self, names: &[String]) -> Result<Vec<Card>> {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut builder = SqlBuilder::new("cards c");
        builder.where_in_lower(&["c.name", "c.faceName"], &names);
        self.query(&mut builder)
    }

    /// Substring search over name, type line and rules text.
    fn search_by_query(&self, query: &str) -> Result<Vec<Card>> {
        let mut builder = SqlBuilder::new("cards c");
        builder
            .where_contains(&["c.name", "c.type", "c.text"], query)
            .limit(SEARCH_LIMIT);
        self.query(&mut builder)
    }

    fn batch_limit(&self) -> usize {
        500
    }
}

fn row_to_card(row: &Row) -> Option<Card> {
    let name = row.get("name")?.as_str()?.to_string();
    let text_of = |col: &str| row.get(col).and_then(Value::as_str).map(str::to_string);

    let color_identity = match row.get("colorIdentity") {
        Some(Value::String(csv)) => parse_colors(&csv.split(',').collect::<Vec<_>>()),
        Some(Value::Array(items)) => parse_colors(
            &items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>(),
        ),
        _ => Vec::new(),
    };
    let legality = text_of("commander").map(|status| match status.to_lowercase().as_str() {
        "legal" => Legality::Legal,
        "banned" => Legality::Banned,
        _ => Legality::NotLegal,
    });
    let type_line = text_of("type").unwrap_or_default();
    let category = type_line
        .contains("Land")
        .then_some(Category::Lands);

    Some(Card {
        name,
        color_identity,
        type_line,
        legalities: Legalities {
            commander: legality,
        },
        mana_value: row.get("manaValue").and_then(Value::as_f64).unwrap_or(0.0),
        mana_cost: text_of("manaCost"),
        oracle_text: text_of("text"),
        category,
        price_usd: None,
        is_resolved: true,
        is_fallback: false,
    })
}
