//! Error taxonomy for the deck-building pipeline.
//!
//! Fatal conditions abort a build and surface to the caller. Non-fatal ones
//! (lookup gaps, scanner fallbacks) never reach this type; they are recorded
//! as [`BuildNotice`](crate::models::BuildNotice)s instead.

#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Could not parse model response ({length} chars): {preview}")]
    Parse { length: usize, preview: String },

    #[error("Only {found} usable cards generated, at least {required} required")]
    InsufficientCards { found: usize, required: usize },

    #[error("Build cancelled during {0}")]
    Cancelled(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ForgeError {
    /// Build a [`ForgeError::Parse`] from the raw response that defeated every
    /// parsing strategy.
    pub fn parse_failure(raw: &str) -> Self {
        ForgeError::Parse {
            length: raw.len(),
            preview: raw.chars().take(crate::config::PARSE_PREVIEW_CHARS).collect(),
        }
    }

    /// Whether re-running the failed stage from scratch may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ForgeError::Parse { .. } | ForgeError::InsufficientCards { .. } | ForgeError::Http(_)
        )
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ForgeError::Configuration(_) => {
                "Deck generation is not configured on this server.".to_string()
            }
            ForgeError::Generation(msg) => msg.clone(),
            ForgeError::Parse { .. } => {
                "The deck generator returned an unreadable list. Please try again.".to_string()
            }
            ForgeError::InsufficientCards { found, .. } => format!(
                "Only {} legal cards were generated. Please try again.",
                found
            ),
            ForgeError::Cancelled(_) => "The deck build was cancelled.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
