//! PostgreSQL entitlement store.
//!
//! One row per user in the `users` table. Other services own other columns
//! on the same row; the merge-write here names exactly the entitlement
//! columns so their data is never clobbered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::billing::{EntitlementPatch, PlanId, UserEntitlement};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{EntitlementStore, StoreError};

/// Columns written by the merge. Kept in one place so the read side and
/// the upsert cannot drift apart.
const MERGE_SQL: &str = "\
    INSERT INTO users (user_id, is_premium, premium_expiry_date, plan_type, last_payment_id, updated_at) \
    VALUES ($1, $2, $3, $4, $5, $6) \
    ON CONFLICT (user_id) DO UPDATE SET \
        is_premium = EXCLUDED.is_premium, \
        premium_expiry_date = EXCLUDED.premium_expiry_date, \
        plan_type = EXCLUDED.plan_type, \
        last_payment_id = EXCLUDED.last_payment_id, \
        updated_at = EXCLUDED.updated_at";

const FIND_SQL: &str = "\
    SELECT user_id, is_premium, premium_expiry_date, plan_type, last_payment_id, updated_at \
    FROM users WHERE user_id = $1";

fn corrupt<T>(result: Result<T, sqlx::Error>) -> Result<T, StoreError> {
    result.map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// `EntitlementStore` backed by PostgreSQL.
pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<UserEntitlement>, StoreError> {
        let row = sqlx::query(FIND_SQL)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Rows can pre-exist with NULL entitlement columns (other services
        // create user rows too); such a user simply has no entitlement yet.
        let is_premium: Option<bool> = corrupt(row.try_get("is_premium"))?;
        let expiry: Option<DateTime<Utc>> = corrupt(row.try_get("premium_expiry_date"))?;
        let plan_str: Option<String> = corrupt(row.try_get("plan_type"))?;
        let last_payment_id: Option<String> = corrupt(row.try_get("last_payment_id"))?;
        let updated_at: Option<DateTime<Utc>> = corrupt(row.try_get("updated_at"))?;

        let (Some(is_premium), Some(expiry), Some(plan_str), Some(last_payment_id), Some(updated_at)) =
            (is_premium, expiry, plan_str, last_payment_id, updated_at)
        else {
            return Ok(None);
        };

        let plan_type = PlanId::parse(&plan_str)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown plan '{}'", plan_str)))?;
        let stored_user: String = corrupt(row.try_get("user_id"))?;

        Ok(Some(UserEntitlement {
            user_id: UserId::new(stored_user).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            is_premium,
            premium_expiry_date: Timestamp::from_datetime(expiry),
            plan_type,
            last_payment_id,
            updated_at: Timestamp::from_datetime(updated_at),
        }))
    }

    async fn merge(&self, user_id: &UserId, patch: &EntitlementPatch) -> Result<(), StoreError> {
        sqlx::query(MERGE_SQL)
            .bind(user_id.as_str())
            .bind(patch.is_premium)
            .bind(patch.premium_expiry_date.as_datetime())
            .bind(patch.plan_type.as_str())
            .bind(patch.last_payment_id.as_str())
            .bind(patch.updated_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITLEMENT_COLUMNS: [&str; 5] = [
        "is_premium",
        "premium_expiry_date",
        "plan_type",
        "last_payment_id",
        "updated_at",
    ];

    #[test]
    fn merge_updates_exactly_the_entitlement_columns() {
        let update_clause = MERGE_SQL.split("DO UPDATE SET").nth(1).unwrap();
        for column in ENTITLEMENT_COLUMNS {
            assert!(
                update_clause.contains(&format!("{} = EXCLUDED.{}", column, column)),
                "merge must set {}",
                column
            );
        }
        // The key is inserted, never updated; no other column may appear.
        assert!(!update_clause.contains("user_id ="));
        assert_eq!(update_clause.matches("EXCLUDED.").count(), ENTITLEMENT_COLUMNS.len());
    }

    #[test]
    fn find_reads_the_same_columns_the_merge_writes() {
        for column in ENTITLEMENT_COLUMNS {
            assert!(FIND_SQL.contains(column), "find must select {}", column);
        }
        assert!(FIND_SQL.contains("WHERE user_id = $1"));
    }
}
