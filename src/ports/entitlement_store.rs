//! Entitlement store port.
//!
//! Contract for the document store holding one user record per user ID.
//! The store offers read and merge-write; a merge touches only the
//! entitlement fields and leaves everything else on the record alone.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::{EntitlementPatch, UserEntitlement};
use crate::domain::foundation::UserId;

/// Port for the persistent user-entitlement store.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Reads the entitlement fields of a user record, if the user has one.
    async fn find(&self, user_id: &UserId) -> Result<Option<UserEntitlement>, StoreError>;

    /// Merge-writes the entitlement fields onto the user record.
    ///
    /// Creates the record if it does not exist. MUST be a partial update:
    /// fields outside the patch are never overwritten.
    async fn merge(&self, user_id: &UserId, patch: &EntitlementPatch) -> Result<(), StoreError>;
}

/// Errors from entitlement store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached or the write failed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be interpreted.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entitlement_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn EntitlementStore) {}
    }

    #[test]
    fn store_errors_display_reason() {
        assert_eq!(
            StoreError::Unavailable("connection refused".to_string()).to_string(),
            "Store unavailable: connection refused"
        );
        assert_eq!(
            StoreError::Corrupt("unknown plan 'weekly'".to_string()).to_string(),
            "Corrupt record: unknown plan 'weekly'"
        );
    }
}
