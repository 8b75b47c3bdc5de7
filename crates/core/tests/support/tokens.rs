use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempolink_core::ports::TokenClient;
use tempolink_domain::{Result as DomainResult, TempoLinkError, TokenGrant};

/// In-memory mock for `TokenClient` with provider-side rotation semantics.
///
/// The mock tracks the one refresh token the provider currently accepts.
/// A successful refresh rotates it, so presenting a superseded token yields
/// `TokenInvalid` just like the real endpoint.
pub struct MockTokenClient {
    valid_refresh: Mutex<String>,
    refresh_calls: AtomicUsize,
    rotations: AtomicUsize,
    fail_network: Mutex<bool>,
}

impl MockTokenClient {
    pub fn accepting(refresh_token: &str) -> Arc<Self> {
        Arc::new(Self {
            valid_refresh: Mutex::new(refresh_token.to_string()),
            refresh_calls: AtomicUsize::new(0),
            rotations: AtomicUsize::new(0),
            fail_network: Mutex::new(false),
        })
    }

    /// Make every refresh fail with a transport error.
    pub fn set_network_failure(&self, fail: bool) {
        *self.fail_network.lock().unwrap() = fail;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// The refresh token the provider currently accepts.
    pub fn current_refresh(&self) -> String {
        self.valid_refresh.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenClient for MockTokenClient {
    async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenGrant> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if *self.fail_network.lock().unwrap() {
            return Err(TempoLinkError::Network("connection reset".into()));
        }

        let mut valid = self.valid_refresh.lock().unwrap();
        if *valid != refresh_token {
            return Err(TempoLinkError::TokenInvalid("invalid_grant".into()));
        }

        let n = self.rotations.fetch_add(1, Ordering::SeqCst) + 1;
        let grant = TokenGrant {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
            expires_in: 3599,
        };
        *valid = grant.refresh_token.clone();
        Ok(grant)
    }

    async fn exchange_code(&self, code: &str, _code_verifier: &str) -> DomainResult<TokenGrant> {
        if code.is_empty() {
            return Err(TempoLinkError::Validation("empty authorization code".into()));
        }
        let grant = TokenGrant {
            access_token: "exchanged-access".into(),
            refresh_token: "exchanged-refresh".into(),
            expires_in: 3599,
        };
        *self.valid_refresh.lock().unwrap() = grant.refresh_token.clone();
        Ok(grant)
    }
}
