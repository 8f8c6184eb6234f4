// ABOUTME: Error types for recipe extraction.
// ABOUTME: Field lookups never fail; only unusable input or a broken site profile does.

use std::fmt;
use thiserror::Error;

/// Errors that can occur before any field extraction starts.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page URL is empty or cannot be parsed.
    #[error("invalid page URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTML document is empty.
    #[error("empty HTML document for {0}")]
    EmptyHtml(String),

    /// A site profile could not be parsed or contains unusable rules.
    #[error("invalid site profile: {0}")]
    Profile(String),
}

impl ExtractError {
    /// Creates an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ExtractError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a Profile error with a custom message.
    pub fn profile(msg: impl fmt::Display) -> Self {
        ExtractError::Profile(msg.to_string())
    }
}
