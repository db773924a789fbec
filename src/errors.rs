// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! Provides typed errors for the API boundary and the search session, plus
//! user-friendly messages with actionable suggestions for the CLI.

use std::fmt;

use crate::filters::FacetKind;

/// Failures talking to the search API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("document '{0}' not found")]
    DocumentNotFound(String),
}

/// Precondition violations raised by the search session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no {0} facet data yet; run a search first")]
    NoFacetData(FacetKind),

    #[error("{kind} facet has {len} buckets; index {index} is out of range")]
    BucketOutOfRange {
        kind: FacetKind,
        index: usize,
        len: usize,
    },

    #[error("'{value}' is not a {kind} facet value of the current results")]
    UnknownFacetValue { kind: FacetKind, value: String },

    #[error("the {0} facet cannot be used as a filter")]
    NotFilterable(FacetKind),
}

/// Failures reported through a controller handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("search controller has shut down")]
    Closed,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Error indicating no search results were found
#[derive(Debug)]
pub struct NoResultsError {
    pub query: String,
    pub cause: Option<String>,
}

impl fmt::Display for NoResultsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Can not find matching query: '{}'\n\n\
             Suggestions:\n\
             - Try a different or broader search query\n\
             - Remove some filters: heline search \"{}\"\n\
             - Check that the search API is reachable (--api-url or HELINE_API_URL)",
            self.query, self.query
        )?;
        if let Some(cause) = &self.cause {
            write!(f, "\n\nLast error: {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for NoResultsError {}

/// Helper functions for creating helpful error messages
pub mod suggestions {
    /// Get a formatted hint for interactive toggle commands
    pub fn toggle_usage_message(facets: &[&str]) -> String {
        format!(
            "Toggle a facet bucket by its number or name: :{} <N | =VALUE>\n\n\
             Example: :repo 1 or :repo =facebook/react",
            facets.join(" | :")
        )
    }

    /// Get suggestion for an unreachable API
    pub fn api_unreachable_suggestion(url: &str) -> String {
        format!(
            "Search API at '{}' did not answer\n\n\
             Try:\n\
             - Starting the heline server locally\n\
             - Pointing the client elsewhere: heline --api-url https://heline.dev search <query>",
            url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_results_message_mentions_query_and_cause() {
        let err = NoResultsError {
            query: "fn main".to_string(),
            cause: Some("search API returned 500: boom".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("'fn main'"));
        assert!(message.contains("Last error: search API returned 500: boom"));
    }

    #[test]
    fn session_error_names_facet() {
        let err = SessionError::BucketOutOfRange {
            kind: FacetKind::Lang,
            index: 7,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "lang facet has 2 buckets; index 7 is out of range"
        );
    }
}
