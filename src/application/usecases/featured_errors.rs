use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeaturedError {
    #[error("listing not found")]
    NotFound,
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("not allowed to manage this listing")]
    Forbidden,
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error(transparent)]
    RemoteStore(#[from] anyhow::Error),
}

impl FeaturedError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeaturedError::NotFound => StatusCode::NOT_FOUND,
            FeaturedError::InvalidPlan(_) | FeaturedError::InvalidWebhook(_) => {
                StatusCode::BAD_REQUEST
            }
            FeaturedError::Unauthenticated => StatusCode::UNAUTHORIZED,
            FeaturedError::Forbidden => StatusCode::FORBIDDEN,
            FeaturedError::RemoteStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, FeaturedError>;
