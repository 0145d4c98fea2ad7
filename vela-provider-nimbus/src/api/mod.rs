//! Nimbus REST API surface
//!
//! Wire types, typed client traits, and the error model shared by all API
//! families. Client implementations own authentication, request construction,
//! and transport-level concerns; this crate only consumes them.

pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vela_core::wait::ProbeError;

/// Error returned by Nimbus API clients
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-2xx response from the platform
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },

    /// A payload did not match the wire schema
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(404, message)
    }

    /// True when the response says the object does not exist.
    ///
    /// The platform returns 403 instead of 404 for missing objects behind
    /// IAM-scoped endpoints (identity pools, API keys whose owner was
    /// removed). That mapping is a quirk of this API, not a general REST
    /// convention, and is preserved here deliberately.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Status { status: 404 | 403, .. })
    }

    /// True for throttling, server errors, and transport failures flagged
    /// retryable
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Transport { retryable, .. } => *retryable,
            Self::Decode(_) => false,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<ApiError> for ProbeError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => ProbeError::Http { status, message },
            ApiError::Transport { message, retryable } => {
                ProbeError::Transport { message, retryable }
            }
            ApiError::Decode(message) => ProbeError::Transport {
                message,
                retryable: false,
            },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Identity and audit fields every API object carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Platform-assigned identifier (e.g., "n-8fx3w", "lkc-q2d7m")
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Platform-owned lifecycle status of an API object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleStatus {
    /// Current lifecycle phase (e.g., "PROVISIONING", "READY")
    pub phase: String,
    /// Error message the platform attached to a failed object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl LifecycleStatus {
    pub fn phase(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            error_detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }
}
