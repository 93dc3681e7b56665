//! `jasmine-client`
//!
//! **Responsibility:** everything between the portal UI and the backend.
//!
//! This crate provides:
//! - A typed HTTP client that normalizes the backend's response shapes
//! - Persistent session storage (token + cached user)
//! - Session bootstrap, login and logout
//! - The [`Portal`] facade that gates routes and builds menus from one
//!   shared permission resolver

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod portal;
pub mod session;
pub mod storage;

pub use config::{ConfigError, PortalConfig};
pub use error::{ClientError, ClientResult, PortalError, StorageError};
pub use http::{ApiClient, Credentials, LoginData};
pub use portal::Portal;
pub use session::SessionStore;
pub use storage::{MemoryStorage, SessionStorage, SqliteStorage};
