//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that occur during identifier construction.
#[derive(Debug, Clone, Error)]
pub enum IdError {
    #[error("Field '{0}' cannot be empty")]
    Empty(&'static str),
}

/// Identifier for an application user, as issued by the mobile app's
/// account system. Opaque to this service; never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning an error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_non_empty_string() {
        let id = UserId::new("user-42").unwrap();
        assert_eq!(id.as_str(), "user-42");
        assert_eq!(id.to_string(), "user-42");
    }

    #[test]
    fn user_id_rejects_empty_string() {
        assert!(UserId::new("").is_err());
    }

    #[test]
    fn user_id_serializes_transparently() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
    }
}
