//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! sync pipeline.

/// Microsoft Graph API base URL.
pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Microsoft identity platform token endpoint (common tenant).
pub const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";

/// Delegated scopes requested on every grant.
pub const OAUTH_SCOPE: &str = "offline_access Calendars.ReadWrite";

/// Single-value extended property carrying the source event id on calendar
/// events. The GUID namespaces the property; Graph `$filter` matches on the
/// full identifier string.
pub const SOURCE_ID_PROPERTY: &str =
    "String {66f5a359-4659-4830-9070-00040ec6ac6e} Name sourceEventId";

/// Display name of the dedicated calendar created for synced events.
pub const SYNC_CALENDAR_NAME: &str = "TempoLink Calendar";

/// Maximum sub-requests per Graph `$batch` call.
pub const GRAPH_BATCH_LIMIT: usize = 20;

/// Pause between sequential batch chunks, to stay under Graph rate limits.
pub const BATCH_PAUSE_MS: u64 = 1000;

/// `Prefer` header value pinning Graph event timestamps to UTC.
pub const OUTLOOK_TIMEZONE_HEADER: &str = r#"outlook.timezone="UTC""#;
