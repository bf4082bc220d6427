//! Staged JSON recovery for model output.
//!
//! Models wrap JSON in prose or markdown fences, leave trailing commas and
//! sometimes add comments. The strategies below are tried in order, most
//! conservative first, and the first success wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{ForgeError, Result};

static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[\]}])").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Top-level JSON shape a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
        }
    }

    fn opening(self) -> char {
        match self {
            Shape::Array => '[',
            Shape::Object => '{',
        }
    }
}

/// Which strategy produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// Fences and trailing commas removed, parsed whole.
    Cleaned,
    /// First bracketed substring of the expected shape.
    Extracted,
    /// Block comments removed before extraction.
    CommentsStripped,
}

type Strategy = fn(&str, Shape) -> std::result::Result<Value, String>;

const STRATEGIES: [(ParseStage, Strategy); 3] = [
    (ParseStage::Cleaned, parse_cleaned),
    (ParseStage::Extracted, parse_extracted),
    (ParseStage::CommentsStripped, parse_without_comments),
];

pub fn strip_fences(raw: &str) -> String {
    FENCE.replace_all(raw, "").into_owned()
}

pub fn strip_trailing_commas(raw: &str) -> String {
    TRAILING_COMMA.replace_all(raw, "$1").into_owned()
}

pub fn strip_block_comments(raw: &str) -> String {
    BLOCK_COMMENT.replace_all(raw, "").into_owned()
}

fn parse_as(text: &str, shape: Shape) -> std::result::Result<Value, String> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|e| e.to_string())?;
    if shape.matches(&value) {
        Ok(value)
    } else {
        Err(format!("expected {:?}, found a different JSON value", shape))
    }
}

fn parse_cleaned(raw: &str, shape: Shape) -> std::result::Result<Value, String> {
    parse_as(&strip_trailing_commas(&strip_fences(raw)), shape)
}

/// First complete value of `shape` starting at an opening bracket. Text after
/// the value is ignored, so a trailing note like `[Budget]` cannot spoil it.
fn extract(text: &str, shape: Shape) -> std::result::Result<Value, String> {
    let text = strip_trailing_commas(text);
    let mut reason = format!("no {:?} substring found", shape);
    for (start, _) in text.match_indices(shape.opening()) {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value)) if shape.matches(&value) => return Ok(value),
            Some(Err(e)) => reason = e.to_string(),
            _ => {}
        }
    }
    Err(reason)
}

fn parse_extracted(raw: &str, shape: Shape) -> std::result::Result<Value, String> {
    extract(&strip_fences(raw), shape)
}

fn parse_without_comments(raw: &str, shape: Shape) -> std::result::Result<Value, String> {
    extract(&strip_block_comments(&strip_fences(raw)), shape)
}

/// Recover a JSON value of the given shape from model output.
///
/// Fails with [`ForgeError::Parse`] only after every strategy has failed.
pub fn parse_model_json(raw: &str, shape: Shape) -> Result<(Value, ParseStage)> {
    for (stage, strategy) in STRATEGIES {
        match strategy(raw, shape) {
            Ok(value) => {
                debug!(?stage, "Parsed model output");
                return Ok((value, stage));
            }
            Err(reason) => debug!(?stage, %reason, "Parse strategy failed"),
        }
    }
    Err(ForgeError::parse_failure(raw))
}
