//! Client Runtime Module
//!
//! Everything the inquiry-circle client does at runtime, organized into
//! focused submodules:
//!
//! - **`api`** - HTTP client wrapper for the backend REST surface
//! - **`storage`** - durable home of the session record
//! - **`session`** - session store (login, logout, restore, re-verify)
//! - **`router`** - route table and navigation guard
//! - **`conference`** - conferencing widget adapter
//! - **`top_bar`** - top-bar display state
//! - **`context`** - the application context tying them together
//!
//! # Example
//!
//! ```rust,no_run
//! use inquiry_circle::client::{AppContext, DetachedHost, FileSessionStorage, Navigation};
//! use inquiry_circle::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let storage = FileSessionStorage::new(config.session_path.clone());
//! let mut ctx = AppContext::new(config, Box::new(storage), DetachedHost)?;
//!
//! if ctx.login("facilitator-key").await {
//!     if let Navigation::Proceed(route) = ctx.navigate("/") {
//!         println!("landed on {}", route.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod conference;
pub mod context;
pub mod router;
pub mod session;
pub mod storage;
pub mod top_bar;

// Re-export commonly used types
pub use api::{error_message, ApiClient};
pub use conference::{
    ConferenceAdapter, ConferenceCommand, ConferenceConfig, ConferenceEvent, ConferenceHost,
    DetachedHost, Widget, WidgetOptions,
};
pub use context::AppContext;
pub use router::{Location, Navigation, Route, RouteTable};
pub use session::{Session, SessionStore};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};
pub use top_bar::TopBar;
