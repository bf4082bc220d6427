//! [`CardSource`] backed by the Scryfall REST API.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::cards::source::CardSource;
use crate::config;
use crate::error::Result;
use crate::models::{parse_colors, Card, Category, Color, Legalities, Legality};

/// Blocking Scryfall client.
pub struct ScryfallClient {
    client: Client,
    base_url: String,
}

impl ScryfallClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            base_url: config::SCRYFALL_API.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl CardSource for ScryfallClient {
    fn lookup_by_name(&self, name: &str) -> Result<Option<Card>> {
        let url = format!("{}/cards/named", self.base_url);
        let resp = self.client.get(&url).query(&[("exact", name)]).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(name, "Scryfall has no card by that name");
            return Ok(None);
        }
        let card: ScryfallCard = resp.error_for_status()?.json()?;
        Ok(Some(card.into_card()))
    }

    fn lookup_batch(&self, names: &[String]) -> Result<Vec<Card>> {
        let url = format!("{}/cards/collection", self.base_url);
        let body = CollectionRequest {
            identifiers: names.iter().map(|n| NameIdentifier { name: n }).collect(),
        };
        let resp: CollectionResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        if !resp.not_found.is_empty() {
            debug!(missing = resp.not_found.len(), "Scryfall collection lookup misses");
        }
        Ok(resp.data.into_iter().map(ScryfallCard::into_card).collect())
    }

    fn search_by_query(&self, query: &str) -> Result<Vec<Card>> {
        let url = format!("{}/cards/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("q", query), ("order", "edhrec")])
            .send()?;
        // Scryfall answers an empty search with 404.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let list: SearchResponse = resp.error_for_status()?.json()?;
        Ok(list.data.into_iter().map(ScryfallCard::into_card).collect())
    }

    fn search_category(&self, category: Category, identity: &[Color]) -> Result<Vec<Card>> {
        let Some(term) = category.search_term() else {
            return Ok(Vec::new());
        };
        self.search_by_query(&category_query(category, term, identity))
    }
}

/// Scryfall syntax for a role search within a color identity, restricted to
/// Commander-legal nonbasic cards.
fn category_query(category: Category, term: &str, identity: &[Color]) -> String {
    let role = match category {
        Category::Lands => "t:land".to_string(),
        _ => format!("o:\"{}\"", term),
    };
    let id = if identity.is_empty() {
        "id:c".to_string()
    } else {
        let symbols: String = identity.iter().map(|c| c.symbol()).collect();
        format!("id<={}", symbols.to_lowercase())
    };
    format!("{} {} -t:basic f:commander", role, id)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CollectionRequest<'a> {
    identifiers: Vec<NameIdentifier<'a>>,
}

#[derive(Serialize)]
struct NameIdentifier<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    data: Vec<ScryfallCard>,
    #[serde(default)]
    not_found: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ScryfallCard>,
}

/// The subset of a Scryfall card object the pipeline reads.
#[derive(Debug, Deserialize)]
pub struct ScryfallCard {
    pub name: String,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub legalities: HashMap<String, String>,
    #[serde(default)]
    pub cmc: f64,
    pub mana_cost: Option<String>,
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub card_faces: Vec<ScryfallFace>,
    #[serde(default)]
    pub prices: HashMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ScryfallFace {
    pub oracle_text: Option<String>,
    pub mana_cost: Option<String>,
}

impl ScryfallCard {
    pub fn into_card(self) -> Card {
        // Double-faced cards keep rules text on the faces.
        let oracle_text = self.oracle_text.or_else(|| {
            let texts: Vec<String> = self
                .card_faces
                .iter()
                .filter_map(|f| f.oracle_text.clone())
                .collect();
            (!texts.is_empty()).then(|| texts.join("\n//\n"))
        });
        let mana_cost = self
            .mana_cost
            .or_else(|| self.card_faces.first().and_then(|f| f.mana_cost.clone()));
        let commander = self.legalities.get("commander").map(|s| match s.as_str() {
            "legal" => Legality::Legal,
            "banned" => Legality::Banned,
            _ => Legality::NotLegal,
        });
        let price_usd = self
            .prices
            .get("usd")
            .and_then(|p| p.as_deref())
            .and_then(|p| p.parse::<f64>().ok());

        Card {
            name: self.name,
            color_identity: parse_colors(&self.color_identity),
            type_line: self.type_line,
            legalities: Legalities { commander },
            mana_value: self.cmc,
            mana_cost,
            oracle_text,
            category: None,
            price_usd,
            is_resolved: true,
            is_fallback: false,
        }
    }
}
