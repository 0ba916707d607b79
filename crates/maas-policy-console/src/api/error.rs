use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use maas_policy_core::error::{ClientCode, PolicyError};

/// `PolicyError` rendered as `{"code": ..., "msg": ...}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub PolicyError);

impl From<PolicyError> for ApiError {
    fn from(e: PolicyError) -> Self {
        Self(e)
    }
}

fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = status_for(code);
        let msg = match &self.0 {
            PolicyError::BadRequest(m) | PolicyError::NotFound(m) => m.clone(),
            // internal details stay in the log
            PolicyError::Internal(m) => {
                tracing::error!(error = %m, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "code": code.as_str(), "msg": msg }))).into_response()
    }
}
