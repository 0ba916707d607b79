//! HTTP/JSON handlers.
//!
//! Handlers take short locks on the application state and never hold a guard
//! across an await. Every failure is rendered by [`ApiError`].

pub mod catalog;
pub mod error;
pub mod evaluate;
pub mod live;
pub mod policies;
pub mod requests;
pub mod simulations;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use maas_policy_core::error::PolicyError;

pub use error::ApiError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Unwrap a JSON body, turning extractor rejections into the common error body.
pub(crate) fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError(PolicyError::BadRequest(e.body_text())))
}
