use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::application::usecases::featured_errors::FeaturedError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<FeaturedError> for AppError {
    fn from(err: FeaturedError) -> Self {
        match err {
            FeaturedError::NotFound => AppError::NotFound,
            FeaturedError::InvalidPlan(plan_id) => {
                AppError::BadRequest(format!("unknown featured plan: {plan_id}"))
            }
            FeaturedError::Unauthenticated => {
                AppError::Unauthorized("authentication required".to_string())
            }
            FeaturedError::Forbidden => AppError::Forbidden,
            FeaturedError::InvalidWebhook(reason) => AppError::BadRequest(reason),
            FeaturedError::RemoteStore(err) => AppError::Internal(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::Unauthorized(reason) => format!("Unauthorized: {reason}"),
            AppError::BadRequest(msg) => msg,
            // Logged by the caller; detail never reaches the client.
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn featured_errors_map_to_http_statuses() {
        let cases = [
            (FeaturedError::NotFound, StatusCode::NOT_FOUND),
            (FeaturedError::InvalidPlan("x".into()), StatusCode::BAD_REQUEST),
            (FeaturedError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (FeaturedError::Forbidden, StatusCode::FORBIDDEN),
            (FeaturedError::InvalidWebhook("bad".into()), StatusCode::BAD_REQUEST),
            (FeaturedError::RemoteStore(anyhow!("db down")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let use_case_status = err.status_code();
            let app_error = AppError::from(err);
            assert_eq!(app_error.status_code(), expected);
            assert_eq!(use_case_status, expected);
        }
    }

    #[test]
    fn internal_errors_are_not_leaked() {
        let response = AppError::Internal(anyhow!("password=hunter2")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
