use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempolink_core::ports::CredentialStore;
use tempolink_domain::{
    CredentialPatch, ProviderCredentials, Result as DomainResult, TempoLinkError, UserRecord,
};

/// In-memory mock for `CredentialStore`.
///
/// Applies merge patches with the same shallow semantics as the real store.
/// An optional one-shot stale record lets tests simulate another worker
/// rotating the token pair between two reads.
#[derive(Default, Clone)]
pub struct MockCredentialStore {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
    stale_first: Arc<Mutex<Option<UserRecord>>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record.
    pub fn with_user(self, record: UserRecord) -> Self {
        self.users.lock().unwrap().insert(record.id.clone(), record);
        self
    }

    /// Serve `record` for the first `load` only, then fall back to the real
    /// map. Simulates a read that raced a concurrent write.
    pub fn with_stale_first(self, record: UserRecord) -> Self {
        *self.stale_first.lock().unwrap() = Some(record);
        self
    }

    /// Current stored record for assertions.
    pub fn get(&self, user_id: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn load(&self, user_id: &str) -> DomainResult<UserRecord> {
        if let Some(stale) = self.stale_first.lock().unwrap().take() {
            if stale.id == user_id {
                return Ok(stale);
            }
        }
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| TempoLinkError::UserNotFound(format!("user {user_id} not found")))
    }

    async fn merge_update(&self, user_id: &str, patch: CredentialPatch) -> DomainResult<()> {
        let mut users = self.users.lock().unwrap();
        let record = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord { id: user_id.to_string(), azure: None });
        let creds = record.azure.get_or_insert_with(ProviderCredentials::default);

        if let Some(connected) = patch.connected {
            creds.connected = connected;
        }
        if let Some(pair) = patch.tokens {
            creds.access_token = pair.access_token;
            creds.refresh_token = pair.refresh_token;
        }
        if let Some(calendar_id) = patch.calendar_id {
            creds.calendar_id = Some(calendar_id);
        }
        if let Some((feature, flag)) = patch.sync_flag {
            creds.sync.insert(feature, flag);
        }
        Ok(())
    }
}

/// A connected user record with the given refresh token.
pub fn connected_user(user_id: &str, refresh_token: &str) -> UserRecord {
    UserRecord {
        id: user_id.to_string(),
        azure: Some(ProviderCredentials {
            connected: true,
            access_token: "stale-access".into(),
            refresh_token: refresh_token.to_string(),
            calendar_id: Some("cal-1".into()),
            sync: Default::default(),
        }),
    }
}
