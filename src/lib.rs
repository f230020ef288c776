//! Inquiry Circle - Client Library
//!
//! Client runtime for the inquiry-circle video discussion product: key-based
//! authentication, circle and session management, circle messaging, the
//! translation correction workflow, and embedding a third-party conferencing
//! widget.
//!
//! # Module Structure
//!
//! - **`shared`** - configuration, error types and backend wire types
//! - **`client`** - API client, session store, route guard, conferencing
//!   adapter and the application context that owns them
//!
//! # Feature Flags
//!
//! - **`cli`** (default) - builds the `circle` command-line entry point
//!
//! # Execution Model
//!
//! All work is driven by user navigation or user-initiated API calls. Network
//! calls and script loading are async; nothing is retried automatically.
//! State is owned by an explicitly constructed `AppContext` rather than
//! process-wide globals.

/// Shared types and data structures
pub mod shared;

/// Client runtime
pub mod client;
