//! Route gating.
//!
//! Pure and synchronous: given the session, what a route requires and the
//! current permission state, decide what the user gets to see. Denials are
//! outcomes, never errors.

use core::str::FromStr;

use serde::Serialize;

use jasmine_core::{DomainError, ModuleKey, RoleId, UserType};

use crate::resolver::{FallbackReason, PermissionState};
use crate::routes::{self, RouteAccess};
use crate::{Principal, Session};

/// How the gate behaves while permissions are unknown or unavailable.
///
/// `FailOpen` renders the page with a warning banner so users never hit a
/// blank screen during a slow lookup; `FailClosed` shows a loading view
/// while pending and denies when only the base-menu fallback is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

impl FromStr for GatePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "open" => Ok(GatePolicy::FailOpen),
            "fail-closed" | "closed" => Ok(GatePolicy::FailClosed),
            other => Err(DomainError::validation(format!(
                "gate policy must be fail-open or fail-closed, got '{other}'"
            ))),
        }
    }
}

/// What a protected route asks of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RouteRequirement {
    pub user_type: Option<UserType>,
    /// Only consulted for customer sessions.
    pub permission: Option<ModuleKey>,
}

impl RouteRequirement {
    pub const fn admin() -> Self {
        Self {
            user_type: Some(UserType::Admin),
            permission: None,
        }
    }

    pub const fn customer(permission: ModuleKey) -> Self {
        Self {
            user_type: Some(UserType::Customer),
            permission: Some(permission),
        }
    }

    pub const fn signed_in() -> Self {
        Self {
            user_type: None,
            permission: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    GoToDashboard,
    ReturnToLogin,
}

/// Non-blocking warning shown above a page rendered without a confirmed grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    PermissionsLoading,
    LimitedPermissions { reason: String },
}

impl Banner {
    pub fn text(&self) -> String {
        match self {
            Banner::PermissionsLoading => {
                "Permissions are still loading. Refresh the page if features look limited.".to_string()
            }
            Banner::LimitedPermissions { reason } => {
                format!("Showing the default portal view ({reason}). Refresh the page if features look limited.")
            }
        }
    }
}

/// Account details shown when a customer has no custom role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDiagnostics {
    pub username: Option<String>,
    pub coarse_role: Option<String>,
    pub role_id: Option<RoleId>,
    pub actions: Vec<GateAction>,
}

/// Everything the access-denied view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDeniedReport {
    pub required: ModuleKey,
    pub reason: String,
    /// Pretty-printed resolved permission map, for support tickets.
    pub permissions_dump: String,
    pub suggestions: Vec<String>,
    pub actions: Vec<GateAction>,
}

/// Terminal render decision for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    RedirectToLogin,
    RedirectHome,
    /// Redirect to a session-specific landing route.
    Redirect { to: &'static str },
    RoleAssignmentRequired(AccountDiagnostics),
    /// Fail-closed policy only: wait for permissions.
    Loading,
    Render { banner: Option<Banner> },
    AccessDenied(AccessDeniedReport),
    NotFound,
}

impl GateOutcome {
    pub const fn render() -> Self {
        GateOutcome::Render { banner: None }
    }

    /// `true` when the wrapped page itself is shown.
    pub fn renders_content(&self) -> bool {
        matches!(self, GateOutcome::Render { .. })
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GateOutcome::RedirectToLogin => Some(routes::LOGIN),
            GateOutcome::RedirectHome => Some(routes::ROOT),
            GateOutcome::Redirect { to } => Some(*to),
            _ => None,
        }
    }
}

/// Evaluate a protected route.
pub fn evaluate(
    session: &Session,
    requirement: &RouteRequirement,
    permissions: &PermissionState,
    policy: GatePolicy,
) -> GateOutcome {
    let principal = Principal::of(session);

    let Some(user_type) = principal.user_type() else {
        return GateOutcome::RedirectToLogin;
    };

    if requirement.user_type.is_some_and(|required| required != user_type) {
        return GateOutcome::RedirectHome;
    }

    let Principal::Customer { user, role_id } = principal else {
        // Admin sessions never consult permission maps.
        return GateOutcome::render();
    };

    let Some(required) = requirement.permission else {
        return GateOutcome::render();
    };

    if role_id.is_none() {
        return GateOutcome::RoleAssignmentRequired(AccountDiagnostics {
            username: user.and_then(|u| u.username.clone()),
            coarse_role: user.and_then(|u| u.role.as_ref()).map(|r| r.to_string()),
            role_id: None,
            actions: vec![GateAction::ReturnToLogin],
        });
    }

    match (permissions, policy) {
        (PermissionState::Pending, GatePolicy::FailOpen) => GateOutcome::Render {
            banner: Some(Banner::PermissionsLoading),
        },
        (PermissionState::Pending, GatePolicy::FailClosed) => GateOutcome::Loading,
        (PermissionState::BaseMenu(reason), GatePolicy::FailOpen) => GateOutcome::Render {
            banner: Some(Banner::LimitedPermissions {
                reason: fallback_text(reason),
            }),
        },
        (PermissionState::BaseMenu(reason), GatePolicy::FailClosed) => {
            GateOutcome::AccessDenied(denied(required, permissions, Some(fallback_text(reason))))
        }
        (PermissionState::Resolved { map, .. }, _) if map.allows(required) => GateOutcome::render(),
        (PermissionState::Resolved { .. } | PermissionState::Unresolvable, _) => {
            GateOutcome::AccessDenied(denied(required, permissions, None))
        }
    }
}

/// Evaluate a navigation to `path` through the route table.
pub fn route_outcome(
    session: &Session,
    path: &str,
    permissions: &PermissionState,
    policy: GatePolicy,
) -> GateOutcome {
    let outcome = match routes::lookup(path) {
        Some(RouteAccess::Public) => GateOutcome::render(),
        _ if !session.is_logged_in() => GateOutcome::RedirectToLogin,
        Some(RouteAccess::Landing) => GateOutcome::Redirect {
            to: routes::landing(session.user_type),
        },
        Some(RouteAccess::Protected(route)) => {
            evaluate(session, &route.requirement, permissions, policy)
        }
        None => GateOutcome::NotFound,
    };

    tracing::debug!(path, user_type = %session.user_type, ?outcome, "route gated");
    outcome
}

fn fallback_text(reason: &FallbackReason) -> String {
    match reason {
        FallbackReason::NoActiveRole { message: Some(m) } => m.clone(),
        FallbackReason::NoActiveRole { message: None } => "no active custom role".to_string(),
        FallbackReason::FetchFailed(err) => format!("role permissions unavailable: {err}"),
    }
}

fn denied(required: ModuleKey, state: &PermissionState, fallback: Option<String>) -> AccessDeniedReport {
    let map = state.map();
    let permissions_dump = map
        .map(|m| serde_json::to_string_pretty(&m.to_value()).unwrap_or_default())
        .unwrap_or_else(|| "{}".to_string());

    let reason = match (fallback, map) {
        (Some(fallback), _) => format!(
            "Access to '{required}' cannot be confirmed: {fallback}"
        ),
        (None, Some(m)) if m.is_empty() => {
            format!("Your role grants no modules; '{required}' requires view access")
        }
        (None, Some(m)) => format!(
            "Your role does not grant view access to '{required}'. Visible modules: {:?}",
            m.visible_modules().iter().map(ModuleKey::as_str).collect::<Vec<_>>()
        ),
        (None, None) => format!("No permissions could be determined; '{required}' requires view access"),
    };

    AccessDeniedReport {
        required,
        reason,
        permissions_dump,
        suggestions: vec![
            format!("Ask an administrator to grant '{}' view access to your role", required.label()),
            "Sign in again if your role was changed recently".to_string(),
        ],
        actions: vec![GateAction::GoToDashboard, GateAction::ReturnToLogin],
    }
}
