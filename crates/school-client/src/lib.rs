//! Munificent School client library.
//!
//! Everything a front end needs to talk to the school backend:
//!
//! - [`session`]: persistent token storage
//! - [`http`]: the REST client that attaches the bearer token to every call
//! - [`auth`]: the session state machine (bootstrap, login, logout)
//! - [`router`]: role-based route resolution
//! - [`api`]: typed calls for users, courses, lessons, applications,
//!   reviews, blog and settings
//! - [`scope`]: cancellation tied to a screen's lifetime
//! - [`listing`] and [`notify`]: list helpers and user-facing notices

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod models;
pub mod notify;
pub mod router;
pub mod scope;
pub mod session;

#[cfg(test)]
mod testing;

pub use auth::{AuthController, AuthEvent, AuthState};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use notify::{Level, Notification};
pub use router::{resolve, Resolution, Screen};
pub use scope::{Scope, ScopeHandle};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
