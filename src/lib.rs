//! Client SDK for the Mentis project tracker.
//!
//! Covers the authentication/session slice every Mentis frontend needs:
//!
//! 1. A [`CredentialStore`] persists exactly two entries across restarts —
//!    the bearer token and an advisory cache of the last known user.
//! 2. [`SessionController`] restores the session once at startup (re-validating
//!    the token against `/auth/me`), exposes login/logout/register/profile
//!    actions, and broadcasts every transition over a watch channel.
//! 3. [`AuthHttp`] attaches the bearer token to outgoing requests and, on a
//!    401, performs exactly one refresh-and-replay behind a single-flight
//!    gate before giving up and clearing the session.
//! 4. [`guard::authorize`] turns a session snapshot plus an optional required
//!    role into an exhaustive allow/deny decision for routing.
//!
//! The crate is headless: rendering, navigation, and user-visible error
//! messaging belong to the embedding application.
//!
//! ```no_run
//! use mentis_client::{ClientConfig, FileStore, SessionController};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), mentis_client::Error> {
//! let store = Arc::new(FileStore::open("mentis/credentials.json"));
//! let session = SessionController::new(&ClientConfig::from_env(), store)?;
//! let state = session.initialize().await;
//!
//! if !state.is_authenticated {
//!     // hand off to the login flow
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod store;

pub use api::AuthHttp;
pub use auth::guard::{self, RouteDecision};
pub use auth::session::{SessionController, SessionState};
pub use auth::types::{ProfileUpdate, RegisterRequest, Role, TokenResponse, User};
pub use config::ClientConfig;
pub use error::{Error, FieldError, ValidationErrors};
pub use store::{CredentialStore, FileStore, MemoryStore, TOKEN_KEY, USER_KEY};
