use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ParseEnumError;
use crate::quota::DenialReason;
use crate::signals::Signal;

/// Error type for every fallible rules-engine operation.
/// Implements `IntoResponse` so handlers embedding the engine can return
/// `Result<T, AppError>` directly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Quota exceeded: {reason}")]
    QuotaExceeded { actor_id: Uuid, reason: DenialReason },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(#[from] ParseEnumError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The notification signal carried by a quota denial, if any.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            AppError::QuotaExceeded { actor_id, reason } => Some(Signal::QuotaDenied {
                actor_id: *actor_id,
                reason: *reason,
            }),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::QuotaExceeded { reason, .. } => (
                StatusCode::FORBIDDEN,
                reason.code(),
                reason.message().to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidRecord(e) => {
                tracing::error!("Invalid stored record: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_quota_denial_maps_to_403_with_stable_code() {
        let (status, body) = render(AppError::QuotaExceeded {
            actor_id: Uuid::new_v4(),
            reason: DenialReason::JobApplicationCapReached,
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "JOB_APPLICATION_CAP_REACHED");
    }

    #[tokio::test]
    async fn test_conflict_and_not_found() {
        let (status, body) = render(AppError::Conflict("lesson already completed".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "lesson already completed");

        let (status, _) = render(AppError::NotFound("job".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let (status, body) = render(AppError::Internal(anyhow::anyhow!("pool exhausted"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("pool exhausted"));
    }

    #[test]
    fn test_only_quota_errors_carry_a_signal() {
        let actor_id = Uuid::new_v4();
        let err = AppError::QuotaExceeded {
            actor_id,
            reason: DenialReason::ApplicationLimitReached,
        };
        assert_eq!(
            err.signal(),
            Some(Signal::QuotaDenied {
                actor_id,
                reason: DenialReason::ApplicationLimitReached
            })
        );
        assert_eq!(AppError::Forbidden("x".into()).signal(), None);
    }
}
