//! HTTP mapping for the domain error taxonomy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tempolink_domain::TempoLinkError;
use tracing::{error, warn};

/// Wrapper turning a domain error into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub TempoLinkError);

impl From<TempoLinkError> for ApiError {
    fn from(value: TempoLinkError) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label) = match &self.0 {
            TempoLinkError::UserNotFound(_) | TempoLinkError::EventNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            TempoLinkError::NotConnected(_) | TempoLinkError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            TempoLinkError::TokenInvalid(_) | TempoLinkError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            TempoLinkError::Network(_) | TempoLinkError::Provider(_) => {
                (StatusCode::BAD_GATEWAY, "upstream")
            }
            TempoLinkError::Config(_)
            | TempoLinkError::Storage(_)
            | TempoLinkError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let body = Json(json!({
            "error": label,
            "details": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: TempoLinkError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(status_of(TempoLinkError::UserNotFound("u".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(TempoLinkError::EventNotFound("e".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(TempoLinkError::NotConnected("u".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(TempoLinkError::Validation("v".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(TempoLinkError::TokenInvalid("t".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(TempoLinkError::Unauthorized("t".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(TempoLinkError::Network("n".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(TempoLinkError::Provider("p".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(TempoLinkError::Storage("s".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
