// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of domain errors onto HTTP responses.
//!
//! Every failure leaves the gateway as `{"success": false, "error": "..."}`.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use leadline_core::LeadlineError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Anything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Domain(LeadlineError),
    /// Malformed request body.
    BadRequest(String),
    Unauthorized(&'static str),
}

impl From<LeadlineError> for ApiError {
    fn from(err: LeadlineError) -> Self {
        Self::Domain(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(LeadlineError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Domain(LeadlineError::Validation(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Domain(LeadlineError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::Domain(err) if status.is_server_error() => {
                tracing::error!(error = %err, "request failed");
                match err {
                    LeadlineError::Timeout { .. } => err.to_string(),
                    _ => "internal server error".to_string(),
                }
            }
            Self::Domain(err) => err.to_string(),
            Self::BadRequest(message) => message,
            Self::Unauthorized(message) => message.to_string(),
        };
        (
            status,
            Json(ErrorResponse {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

/// `Json<T>` whose rejection is reported through [`ApiError`].
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (LeadlineError::conversation_not_found("c"), StatusCode::NOT_FOUND),
            (LeadlineError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                LeadlineError::Timeout {
                    duration: Duration::from_secs(2),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (LeadlineError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let response = ApiError::from(LeadlineError::Internal("disk path /var/x".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "internal server error");
    }
}
