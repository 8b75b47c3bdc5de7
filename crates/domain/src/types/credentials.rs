//! User credential bundle and merge-patch types
//!
//! The credential bundle mirrors the provider sub-document persisted per
//! user: connection flag, token pair, dedicated calendar id, and per-feature
//! sync flags. All mutation flows through [`CredentialPatch`], which is a
//! shallow merge at the top level of the sub-document — fields a patch does
//! not name are preserved verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-feature sync opt-in, toggleable independently from the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncFeature {
    TimeEntries,
    TimeOff,
    ScheduledTime,
}

impl SyncFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeEntries => "timeEntries",
            Self::TimeOff => "timeOff",
            Self::ScheduledTime => "scheduledTime",
        }
    }
}

/// State of one sync toggle: its current value plus whether the user has
/// ever initialized it (drives the front-end form's default rendering).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFlag {
    pub value: bool,
    pub initialized: bool,
}

/// OAuth token pair. Access and refresh tokens are always replaced together;
/// carrying them as one value keeps a half-updated pair unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Full grant returned by the authorization-code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl TokenGrant {
    pub fn into_pair(self) -> TokenPair {
        TokenPair { access_token: self.access_token, refresh_token: self.refresh_token }
    }
}

/// The provider credential sub-bundle stored on each user record.
///
/// `connected == false` means the stored tokens must not be used for any
/// provider call until a fresh connect flow re-establishes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderCredentials {
    pub connected: bool,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sync: BTreeMap<SyncFeature, SyncFlag>,
}

impl ProviderCredentials {
    /// Whether a feature's sync toggle is currently on.
    pub fn feature_enabled(&self, feature: SyncFeature) -> bool {
        self.sync.get(&feature).map(|flag| flag.value).unwrap_or(false)
    }
}

/// Partial update applied to the provider sub-bundle by shallow merge.
///
/// Token updates go through the `tokens` pair so the access/refresh
/// invariant holds by construction.
#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
    pub connected: Option<bool>,
    pub tokens: Option<TokenPair>,
    pub calendar_id: Option<String>,
    pub sync_flag: Option<(SyncFeature, SyncFlag)>,
}

impl CredentialPatch {
    /// Patch that persists a freshly rotated token pair.
    pub fn tokens(pair: TokenPair) -> Self {
        Self { tokens: Some(pair), ..Self::default() }
    }

    /// Patch that records a completed connect flow.
    pub fn connect(pair: TokenPair) -> Self {
        Self { connected: Some(true), tokens: Some(pair), ..Self::default() }
    }

    /// Patch that tears down delegated access. Tokens, calendar id, and sync
    /// flags stay in place; only the connection flag drops.
    pub fn disconnect() -> Self {
        Self { connected: Some(false), ..Self::default() }
    }

    /// Patch that records the dedicated calendar id.
    pub fn calendar(calendar_id: impl Into<String>) -> Self {
        Self { calendar_id: Some(calendar_id.into()), ..Self::default() }
    }

    /// Patch that sets one sync toggle, marking it initialized.
    pub fn sync_flag(feature: SyncFeature, value: bool) -> Self {
        Self { sync_flag: Some((feature, SyncFlag { value, initialized: true })), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.connected.is_none()
            && self.tokens.is_none()
            && self.calendar_id.is_none()
            && self.sync_flag.is_none()
    }
}

/// One user record from the document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    /// Provider credential sub-bundle; absent until the user first connects.
    pub azure: Option<ProviderCredentials>,
}

/// Per-user connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Expired,
}

impl ConnectionState {
    /// Observable state of a stored bundle. `Expired` is a transition-time
    /// state and is persisted as disconnected, so it never reads back.
    pub fn of(credentials: Option<&ProviderCredentials>) -> Self {
        match credentials {
            Some(c) if c.connected => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for types::credentials.
    use super::*;

    #[test]
    fn sync_feature_serializes_as_camel_case_key() {
        let mut sync = BTreeMap::new();
        sync.insert(SyncFeature::ScheduledTime, SyncFlag { value: true, initialized: true });
        let json = serde_json::to_value(&sync).unwrap();
        assert!(json.get("scheduledTime").is_some());
    }

    #[test]
    fn feature_enabled_defaults_to_false() {
        let creds = ProviderCredentials::default();
        assert!(!creds.feature_enabled(SyncFeature::TimeEntries));
    }

    #[test]
    fn connect_patch_carries_token_pair_and_flag() {
        let patch = CredentialPatch::connect(TokenPair {
            access_token: "at".into(),
            refresh_token: "rt".into(),
        });
        assert_eq!(patch.connected, Some(true));
        assert!(patch.tokens.is_some());
        assert!(patch.calendar_id.is_none());
        assert!(patch.sync_flag.is_none());
    }

    #[test]
    fn disconnect_patch_touches_only_the_flag() {
        let patch = CredentialPatch::disconnect();
        assert_eq!(patch.connected, Some(false));
        assert!(patch.tokens.is_none());
        assert!(patch.calendar_id.is_none());
        assert!(patch.sync_flag.is_none());
    }

    #[test]
    fn connection_state_of_bundle() {
        assert_eq!(ConnectionState::of(None), ConnectionState::Disconnected);

        let mut creds = ProviderCredentials::default();
        assert_eq!(ConnectionState::of(Some(&creds)), ConnectionState::Disconnected);

        creds.connected = true;
        assert_eq!(ConnectionState::of(Some(&creds)), ConnectionState::Connected);
    }
}
