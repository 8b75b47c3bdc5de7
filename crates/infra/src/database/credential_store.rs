//! SQLite-backed credential store.
//!
//! Each user row carries the provider credential bundle as one JSON
//! document. Updates go through a shallow merge applied inside a single
//! transaction, so concurrent patches to different fields never clobber
//! each other and unknown keys written by other versions survive. All
//! database operations run in `spawn_blocking` to avoid blocking the async
//! runtime.

use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::{json, Value};
use tempolink_core::ports::CredentialStore;
use tempolink_domain::{
    CredentialPatch, DatabaseConfig, ProviderCredentials, Result as DomainResult, TempoLinkError,
    UserRecord,
};
use tokio::task;

use crate::errors::InfraError;

/// SQLite-backed credential store.
pub struct SqliteCredentialStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteCredentialStore {
    /// Open (or create) the database at the configured path and ensure the
    /// schema exists.
    pub fn new(config: &DatabaseConfig) -> DomainResult<Self> {
        let manager = SqliteConnectionManager::file(&config.path);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .build(manager)
            .map_err(InfraError::from)?;

        let conn = pool.get().map_err(|e| TempoLinkError::Storage(e.to_string()))?;
        init_schema(&conn).map_err(InfraError::from)?;
        drop(conn);

        Ok(Self { pool })
    }

    fn connection(
        pool: &Pool<SqliteConnectionManager>,
    ) -> DomainResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        pool.get().map_err(|e| TempoLinkError::Storage(format!("connection pool error: {e}")))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn load(&self, user_id: &str) -> DomainResult<UserRecord> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<UserRecord> {
            let conn = Self::connection(&pool)?;
            query_user(&conn, &user_id)
        })
        .await
        .map_err(InfraError::from)?
    }

    async fn merge_update(&self, user_id: &str, patch: CredentialPatch) -> DomainResult<()> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = Self::connection(&pool)?;
            merge_patch(&mut conn, &user_id, &patch)
        })
        .await
        .map_err(InfraError::from)?
    }
}

// ============================================================================
// Synchronous SQL operations (called inside spawn_blocking)
// ============================================================================

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id         TEXT PRIMARY KEY,
            azure      TEXT,
            updated_at INTEGER NOT NULL
        )",
    )
}

fn query_user(conn: &Connection, user_id: &str) -> DomainResult<UserRecord> {
    let azure_json: Option<Option<String>> = conn
        .query_row("SELECT azure FROM users WHERE id = ?1", params![user_id], |row| row.get(0))
        .optional()
        .map_err(InfraError::from)?;

    let azure_json = azure_json
        .ok_or_else(|| TempoLinkError::UserNotFound(format!("user {user_id} not found")))?;

    let azure = match azure_json {
        Some(raw) => Some(
            serde_json::from_str::<ProviderCredentials>(&raw).map_err(InfraError::from)?,
        ),
        None => None,
    };

    Ok(UserRecord { id: user_id.to_string(), azure })
}

/// Apply a shallow merge patch inside one immediate transaction. The record
/// is created on first write.
fn merge_patch(conn: &mut Connection, user_id: &str, patch: &CredentialPatch) -> DomainResult<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(InfraError::from)?;

    let existing: Option<Option<String>> = tx
        .query_row("SELECT azure FROM users WHERE id = ?1", params![user_id], |row| row.get(0))
        .optional()
        .map_err(InfraError::from)?;

    let mut document: Value = match existing.flatten() {
        Some(raw) => serde_json::from_str(&raw).map_err(InfraError::from)?,
        None => json!({}),
    };
    apply_patch(&mut document, patch)?;

    let serialized = serde_json::to_string(&document).map_err(InfraError::from)?;
    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO users (id, azure, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
            azure = excluded.azure,
            updated_at = excluded.updated_at",
        params![user_id, serialized, now],
    )
    .map_err(InfraError::from)?;

    tx.commit().map_err(InfraError::from)?;
    Ok(())
}

/// Shallow merge at the top level of the provider document. Keys the patch
/// does not name, including keys this version does not know about, are left
/// untouched.
fn apply_patch(document: &mut Value, patch: &CredentialPatch) -> DomainResult<()> {
    if !document.is_object() {
        *document = json!({});
    }
    let obj = match document.as_object_mut() {
        Some(obj) => obj,
        None => return Err(TempoLinkError::Internal("credential document is not an object".into())),
    };

    if let Some(connected) = patch.connected {
        obj.insert("connected".into(), json!(connected));
    }
    if let Some(pair) = &patch.tokens {
        obj.insert("accessToken".into(), json!(pair.access_token));
        obj.insert("refreshToken".into(), json!(pair.refresh_token));
    }
    if let Some(calendar_id) = &patch.calendar_id {
        obj.insert("calendarId".into(), json!(calendar_id));
    }
    if let Some((feature, flag)) = &patch.sync_flag {
        let sync = obj.entry("sync").or_insert_with(|| json!({}));
        if !sync.is_object() {
            *sync = json!({});
        }
        sync[feature.as_str()] = serde_json::to_value(flag).map_err(InfraError::from)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tempolink_domain::{SyncFeature, TokenPair};

    use super::*;

    fn store(dir: &TempDir) -> SqliteCredentialStore {
        let config = DatabaseConfig {
            path: dir.path().join("test.db").to_string_lossy().into_owned(),
            pool_size: 2,
        };
        SqliteCredentialStore::new(&config).unwrap()
    }

    fn pair(n: u32) -> TokenPair {
        TokenPair { access_token: format!("at-{n}"), refresh_token: format!("rt-{n}") }
    }

    #[tokio::test]
    async fn unknown_user_is_user_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store.load("nobody").await.unwrap_err();
        assert!(matches!(err, TempoLinkError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn merge_creates_record_and_patches_accumulate() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.merge_update("u1", CredentialPatch::connect(pair(1))).await.unwrap();
        store.merge_update("u1", CredentialPatch::calendar("cal-1")).await.unwrap();
        store
            .merge_update("u1", CredentialPatch::sync_flag(SyncFeature::TimeEntries, true))
            .await
            .unwrap();

        let record = store.load("u1").await.unwrap();
        let creds = record.azure.unwrap();
        assert!(creds.connected);
        assert_eq!(creds.access_token, "at-1");
        assert_eq!(creds.refresh_token, "rt-1");
        assert_eq!(creds.calendar_id.as_deref(), Some("cal-1"));
        assert!(creds.feature_enabled(SyncFeature::TimeEntries));
    }

    #[tokio::test]
    async fn token_patch_replaces_pair_and_preserves_siblings() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.merge_update("u1", CredentialPatch::connect(pair(1))).await.unwrap();
        store.merge_update("u1", CredentialPatch::calendar("cal-1")).await.unwrap();
        store.merge_update("u1", CredentialPatch::tokens(pair(2))).await.unwrap();

        let creds = store.load("u1").await.unwrap().azure.unwrap();
        assert_eq!(creds.access_token, "at-2");
        assert_eq!(creds.refresh_token, "rt-2");
        assert!(creds.connected);
        assert_eq!(creds.calendar_id.as_deref(), Some("cal-1"));
    }

    #[tokio::test]
    async fn disconnect_only_drops_the_flag() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.merge_update("u1", CredentialPatch::connect(pair(1))).await.unwrap();
        store
            .merge_update("u1", CredentialPatch::sync_flag(SyncFeature::TimeOff, true))
            .await
            .unwrap();
        store.merge_update("u1", CredentialPatch::disconnect()).await.unwrap();

        let creds = store.load("u1").await.unwrap().azure.unwrap();
        assert!(!creds.connected);
        assert_eq!(creds.refresh_token, "rt-1");
        assert!(creds.feature_enabled(SyncFeature::TimeOff));
    }

    #[tokio::test]
    async fn sync_flags_merge_per_feature() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .merge_update("u1", CredentialPatch::sync_flag(SyncFeature::TimeEntries, true))
            .await
            .unwrap();
        store
            .merge_update("u1", CredentialPatch::sync_flag(SyncFeature::TimeOff, false))
            .await
            .unwrap();

        let creds = store.load("u1").await.unwrap().azure.unwrap();
        assert!(creds.feature_enabled(SyncFeature::TimeEntries));
        assert!(!creds.feature_enabled(SyncFeature::TimeOff));
        assert!(creds.sync[&SyncFeature::TimeOff].initialized);
    }

    #[tokio::test]
    async fn unknown_document_keys_survive_patches() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        // Simulate a document written by a newer version with extra keys.
        {
            let conn = store.pool.get().unwrap();
            conn.execute(
                "INSERT INTO users (id, azure, updated_at) VALUES (?1, ?2, 0)",
                params![
                    "u1",
                    r#"{"connected":true,"accessToken":"a","refreshToken":"r","futureField":42}"#
                ],
            )
            .unwrap();
        }

        store.merge_update("u1", CredentialPatch::calendar("cal-9")).await.unwrap();

        let raw: String = {
            let conn = store.pool.get().unwrap();
            conn.query_row("SELECT azure FROM users WHERE id = 'u1'", [], |row| row.get(0))
                .unwrap()
        };
        let document: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document["futureField"], 42);
        assert_eq!(document["calendarId"], "cal-9");
        assert_eq!(document["connected"], true);
    }
}
