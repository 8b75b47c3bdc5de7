//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tempolink_domain::TempoLinkError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TempoLinkError);

impl From<InfraError> for TempoLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TempoLinkError> for InfraError {
    fn from(value: TempoLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTempoLinkError {
    fn into_tempolink(self) -> TempoLinkError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TempoLinkError */
/* -------------------------------------------------------------------------- */

impl IntoTempoLinkError for SqlError {
    fn into_tempolink(self) -> TempoLinkError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => TempoLinkError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        TempoLinkError::Storage("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        TempoLinkError::Storage(format!("constraint violation: {message}"))
                    }
                    _ => TempoLinkError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                TempoLinkError::UserNotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                TempoLinkError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TempoLinkError::Storage(format!("invalid column type: {ty}"))
            }
            RE::InvalidQuery => TempoLinkError::Storage("invalid SQL query".into()),
            other => TempoLinkError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_tempolink())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → TempoLinkError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(TempoLinkError::Storage(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TempoLinkError */
/* -------------------------------------------------------------------------- */

impl IntoTempoLinkError for HttpError {
    fn into_tempolink(self) -> TempoLinkError {
        if self.is_timeout() {
            return TempoLinkError::Network("HTTP request timed out".into());
        }
        if self.is_connect() {
            return TempoLinkError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => TempoLinkError::Unauthorized(message),
                404 => TempoLinkError::EventNotFound(message),
                400..=499 => TempoLinkError::Validation(message),
                500..=599 => TempoLinkError::Provider(message),
                _ => TempoLinkError::Network(message),
            };
        }

        TempoLinkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_tempolink())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → TempoLinkError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(TempoLinkError::Internal(format!("JSON (de)serialization failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* tokio JoinError → TempoLinkError */
/* -------------------------------------------------------------------------- */

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(TempoLinkError::Internal(format!("blocking task failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
