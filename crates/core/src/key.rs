//! [`NodeKey`] — the normalized `node_type` tag used to look up a handler
//! in the node registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A normalized node type tag, e.g. `"http_request"`.
///
/// Normalization lowercases the input and folds spaces/dashes to
/// underscores, so `"HTTP Request"`, `"http-request"`, and `"http_request"`
/// all resolve to the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

/// Error returned when a raw string cannot become a [`NodeKey`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NodeKeyError {
    /// The input was empty after trimming.
    #[error("node key must not be empty")]
    Empty,
}

impl NodeKey {
    /// Normalize and construct a key from a raw string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, NodeKeyError> {
        let normalized = normalize(raw.as_ref());
        if normalized.is_empty() {
            return Err(NodeKeyError::Empty);
        }
        Ok(Self(normalized))
    }

    /// The normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

impl FromStr for NodeKey {
    type Err = NodeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(
            NodeKey::new("HTTP Request").unwrap(),
            NodeKey::new("http_request").unwrap()
        );
        assert_eq!(
            NodeKey::new("http-request").unwrap(),
            NodeKey::new("http_request").unwrap()
        );
    }

    #[test]
    fn empty_key_errors() {
        assert_eq!(NodeKey::new("   ").unwrap_err(), NodeKeyError::Empty);
    }

    #[test]
    fn from_str_matches_new() {
        let a: NodeKey = "Chat Command Branch".parse().unwrap();
        assert_eq!(a.as_str(), "chat_command_branch");
    }

    #[test]
    fn display_shows_normalized_form() {
        let key = NodeKey::new("Reply Message").unwrap();
        assert_eq!(key.to_string(), "reply_message");
    }
}
