//! Shared Error Types
//!
//! This module defines the error types surfaced by the client runtime.
//!
//! # Error Categories
//!
//! - `ClientError::Network` - no response was received (refused, timed out)
//! - `ClientError::Status` - the backend answered with a 4xx/5xx status
//! - `ClientError::Decode` - a response body did not match its declared shape
//! - `ClientError::Storage` - the durable session record could not be used
//! - `ConferenceError` - the conferencing widget could not be embedded
//!
//! Raw transport errors never leave the client: they are classified into one
//! of the variants above at the point of origin.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::ConfigError;

/// Why a request produced no response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// The backend refused the connection (not running, wrong port)
    ConnectionRefused,
    /// The per-request timeout elapsed
    Timeout,
    /// Anything else below HTTP (DNS, TLS, reset)
    Other,
}

/// Error body returned by the backend alongside a failing status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors produced by the API client and the session store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response
    #[error("network error: {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        body: Option<ApiErrorBody>,
    },

    /// The response body did not match the expected schema
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// An operation needed a credential and none is attached
    #[error("not authenticated")]
    NotAuthenticated,

    /// The durable session record could not be read or written
    #[error("session storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// HTTP status, when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            Self::Network {
                kind: NetworkErrorKind::ConnectionRefused,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
                body: None,
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::ConnectionRefused
        } else {
            NetworkErrorKind::Other
        };
        Self::Network {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Errors raised while embedding the conferencing widget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConferenceError {
    #[error("failed to load conferencing script from {url}: {reason}")]
    ScriptLoad { url: String, reason: String },

    #[error("container with id {0} not found")]
    ContainerNotFound(String),

    #[error("conferencing widget constructor is not available")]
    ConstructorMissing,

    #[error("no active conference")]
    NoActiveConference,

    #[error("session has no circle with a conference room")]
    NoRoom,
}

/// Failures of flows that span the backend and the conferencing widget.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Conference(#[from] ConferenceError),
}
