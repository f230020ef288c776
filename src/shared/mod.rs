//! Shared Module
//!
//! Platform-agnostic types used throughout the client: configuration, error
//! types, and the wire types exchanged with the backend REST surface.

/// Application configuration
pub mod config;

/// Shared error types
pub mod error;

/// Backend wire types
pub mod models;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::{ApiErrorBody, ClientError, ConferenceError, FlowError, NetworkErrorKind};
pub use models::{CircleSummary, Role};
