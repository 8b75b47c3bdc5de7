//! Connection lifecycle transitions
//!
//! Every lifecycle transition maps to exactly one credential patch, and the
//! patch is persisted before the triggering operation returns. `Expired` is
//! transition-only: it persists as disconnected, so a stored bundle only
//! ever reads back as connected or disconnected.

use tempolink_domain::{CredentialPatch, TokenPair};

/// A connection lifecycle transition and the data it carries.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Connect flow completed with a fresh grant.
    Connected(TokenPair),
    /// Routine token rotation on an already-connected user.
    Refreshed(TokenPair),
    /// The refresh token was rejected as revoked or expired.
    Expired,
    /// The user tore down delegated access.
    Disconnected,
}

impl Transition {
    /// The patch this transition persists.
    pub fn patch(self) -> CredentialPatch {
        match self {
            Self::Connected(pair) => CredentialPatch::connect(pair),
            Self::Refreshed(pair) => CredentialPatch::tokens(pair),
            Self::Expired | Self::Disconnected => CredentialPatch::disconnect(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for connection transitions.
    use super::*;

    fn pair() -> TokenPair {
        TokenPair { access_token: "at".into(), refresh_token: "rt".into() }
    }

    #[test]
    fn connected_sets_flag_and_tokens() {
        let patch = Transition::Connected(pair()).patch();
        assert_eq!(patch.connected, Some(true));
        assert!(patch.tokens.is_some());
    }

    #[test]
    fn refreshed_replaces_only_the_pair() {
        let patch = Transition::Refreshed(pair()).patch();
        assert!(patch.connected.is_none());
        assert!(patch.tokens.is_some());
        assert!(patch.calendar_id.is_none());
    }

    #[test]
    fn expired_persists_as_disconnected() {
        let patch = Transition::Expired.patch();
        assert_eq!(patch.connected, Some(false));
        assert!(patch.tokens.is_none());
    }
}
