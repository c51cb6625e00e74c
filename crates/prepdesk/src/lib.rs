//! # prepdesk
//!
//! Client session core for the prepdesk interview-preparation app.
//!
//! The crate owns who the signed-in user is: it restores the session the
//! previous process persisted, signs users in and out against the auth
//! API, and hands every view one shared [`SessionContext`] to read from.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prepdesk::prelude::*;
//!
//! # async fn run() -> Result<(), PrepdeskError> {
//! let config = ClientConfig::load(None)?;
//! prepdesk::logging::init(&config.log_filter)?;
//!
//! let context = SessionContext::builder().config(config).build()?;
//! context.session().login("alice", "secret").await?;
//!
//! match require_auth(&context) {
//!     Access::Granted(identity) => println!("hello {}", identity.label()),
//!     Access::Redirect(route) => println!("go to {route}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod logging;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use context::{SessionContext, SessionContextBuilder};
pub use error::PrepdeskError;
pub use guard::{Access, LOGIN_ROUTE, require_auth};

pub use prepdesk_protocol as protocol;
pub use prepdesk_session as session;
pub use prepdesk_storage as storage;
pub use prepdesk_transport as transport;

pub mod prelude {
    pub use crate::api::{ApiClient, ApiError};
    pub use crate::config::ClientConfig;
    pub use crate::context::SessionContext;
    pub use crate::error::PrepdeskError;
    pub use crate::guard::{Access, require_auth};

    pub use prepdesk_protocol::{AccessToken, Identity, UserId};
    pub use prepdesk_session::{SessionError, SessionState, StaleResponsePolicy};
    pub use prepdesk_storage::{FileStore, KeyValueStore, MemoryStore};
    pub use prepdesk_transport::{AuthService, HttpAuthService};
}
