//! `jasmine-core`: portal vocabulary shared by every other crate.
//!
//! Pure types only: no HTTP, no storage, no async.

pub mod account;
pub mod error;
pub mod id;
pub mod module;

pub use account::{CoarseRole, UserType};
pub use error::{DomainError, DomainResult};
pub use id::{RoleId, UserId};
pub use module::ModuleKey;
