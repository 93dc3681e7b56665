//! `jasmine-auth`: client-side authorization for the portal.
//!
//! One permission resolver feeds both the route guard and the menu builder,
//! so the sidebar can never offer a link the guard would refuse.
//! This crate is decoupled from HTTP and storage; the backend lookup is the
//! [`RolePermissionSource`] trait.

pub mod guard;
pub mod menu;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod routes;
pub mod session;
pub mod user;

pub use guard::{
    AccessDeniedReport, AccountDiagnostics, Banner, GateAction, GateOutcome, GatePolicy,
    RouteRequirement, evaluate, route_outcome,
};
pub use menu::{Menu, MenuEntry, MenuSection, build_menu};
pub use permissions::{ModuleGrant, PermissionMap};
pub use principal::Principal;
pub use resolver::{
    FallbackReason, MyRolePermissions, PermissionOrigin, PermissionResolver, PermissionState,
    ResolveError, RolePermissionSource,
};
pub use roles::{Role, RoleDraft, RoleStatus, RoleSummary};
pub use session::Session;
pub use user::User;
