//! Client session management for prepdesk.
//!
//! This crate handles the lifecycle of the signed-in user:
//!
//! 1. **Restore** - picking up the session the previous process persisted
//! 2. **Login / register** - exchanging credentials for an access token
//!    through an [`AuthService`](prepdesk_transport::AuthService)
//! 3. **Logout** - clearing memory and storage together
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)  ← route guards, API client, navigation read the session
//!     ↕
//! Session Layer (this crate)  ← owns identity + token, enforces pairing
//!     ↕                  ↕
//! Transport (auth API)   Storage (durable keys)
//! ```
//!
//! [`SessionState`] transitions are pure; [`PersistedSession`] is the only
//! code that touches storage; [`SessionManager`] sequences the two.

mod error;
mod manager;
mod persist;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use persist::PersistedSession;
pub use session::{SessionConfig, SessionState, StaleResponsePolicy};
