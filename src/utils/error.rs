use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// A single field violation reported by the schema validator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("invalid submission ({} field error(s))", .0.len())]
    Validation(Vec<FieldError>),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("captcha verification failed: {reason}")]
    Verification { reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("email dispatch failed: {reason}")]
    Dispatch { reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl SubmitError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn verification(reason: impl Into<String>) -> Self {
        Self::Verification {
            reason: reason.into(),
        }
    }

    pub fn dispatch(reason: impl Into<String>) -> Self {
        Self::Dispatch {
            reason: reason.into(),
        }
    }

    /// HTTP status class for each failure: client errors for
    /// validation/verification, 429 for rate limiting, server errors for
    /// configuration and provider failures.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Verification { .. } => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Config { .. } | Self::Dispatch { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        // Server-side failures keep their detail in the logs; the response
        // body never names the provider or the credential.
        let status = self.status_code();
        let body = match self {
            Self::Validation(details) => ErrorBody {
                error: "Invalid request data",
                details: Some(details),
            },
            Self::RateLimited => ErrorBody {
                error: "Too many requests",
                details: None,
            },
            Self::Verification { reason } => {
                tracing::warn!(reason = %reason, "captcha verification rejected");
                ErrorBody {
                    error: "Invalid captcha",
                    details: None,
                }
            }
            Self::Config { message } => {
                tracing::error!(message = %message, "configuration error on request path");
                ErrorBody {
                    error: "Internal server error",
                    details: None,
                }
            }
            Self::Dispatch { reason } => {
                tracing::error!(reason = %reason, "email dispatch failed");
                ErrorBody {
                    error: "Failed to send email",
                    details: None,
                }
            }
            Self::Internal(message) => {
                tracing::error!(message = %message, "internal error");
                ErrorBody {
                    error: "Internal server error",
                    details: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SubmitError>;
