//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;

use crate::retriever::RetrieverError;
use crate::service::llm::CompletionError;
use crate::service::sigma::SigmaError;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Unified API error type
///
/// All API endpoints return `Result<T, ApiError>` for consistent error
/// handling. Messages are user-visible; the error body is always
/// `{"error": <message>}`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Missing or empty request input (400)
    #[error("{0}")]
    BadRequest(String),

    /// Failure fetching narrative content from a URL (500)
    #[error("Failed to fetch URL content: {0}")]
    UpstreamFetch(String),

    /// Model pipeline or rule synthesis failure (500)
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamFetch(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::UpstreamFetch(_) => "upstream_fetch",
            ApiError::Internal(_) => "internal_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<CompletionError> for ApiError {
    fn from(err: CompletionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RetrieverError> for ApiError {
    fn from(err: RetrieverError) -> Self {
        ApiError::UpstreamFetch(err.to_string())
    }
}

impl From<SigmaError> for ApiError {
    fn from(err: SigmaError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
