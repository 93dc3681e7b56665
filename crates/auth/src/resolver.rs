//! Permission resolution shared by the route guard and the menu builder.
//!
//! Resolution order (first match wins):
//! 1. `user.userRole.permissions`
//! 2. the caller's own role permissions from the backend, when `role_id` is set
//! 3. `user.permissions`
//!
//! Role-endpoint results are cached per identity for a short TTL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use jasmine_core::{DomainError, RoleId, UserId};

use crate::roles::RoleSummary;
use crate::{PermissionMap, User};

/// Body of the "my role permissions" endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MyRolePermissions {
    #[serde(rename = "hasRole", alias = "has_role", default)]
    pub has_role: bool,
    #[serde(default)]
    pub role: Option<RoleSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend lookup of the signed-in user's own role permissions.
#[async_trait]
pub trait RolePermissionSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn my_role_permissions(&self) -> Result<MyRolePermissions, Self::Error>;
}

/// Where a resolved permission map came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOrigin {
    EmbeddedRole,
    RoleEndpoint,
    UserRecord,
}

impl core::fmt::Display for PermissionOrigin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            PermissionOrigin::EmbeddedRole => "userRole.permissions",
            PermissionOrigin::RoleEndpoint => "role permissions endpoint",
            PermissionOrigin::UserRecord => "user.permissions",
        })
    }
}

/// Why the base (unfiltered) menu is shown instead of a role's map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The backend reports no active custom role.
    NoActiveRole { message: Option<String> },
    /// The role lookup failed in transport or was rejected by the API.
    FetchFailed(String),
}

/// What is known about a user's permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionState {
    /// Resolution has not completed yet.
    Pending,
    Resolved {
        map: PermissionMap,
        origin: PermissionOrigin,
    },
    BaseMenu(FallbackReason),
    /// Nothing to resolve from: the user genuinely has no permissions.
    Unresolvable,
}

impl PermissionState {
    pub fn resolved(map: PermissionMap, origin: PermissionOrigin) -> Self {
        PermissionState::Resolved { map, origin }
    }

    pub fn map(&self) -> Option<&PermissionMap> {
        match self {
            PermissionState::Resolved { map, .. } => Some(map),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("corrupt permissions in {origin}: {source}")]
    CorruptPermissions {
        origin: PermissionOrigin,
        #[source]
        source: DomainError,
    },

    #[error("malformed role permissions response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    user_id: UserId,
    role_id: RoleId,
}

#[derive(Debug, Clone)]
struct CachedState {
    state: PermissionState,
    cached_at: DateTime<Utc>,
}

/// One identity's cache entry. Its lock is held across the fetch.
type Slot = Arc<Mutex<Option<CachedState>>>;

/// Shared resolver. One instance serves every consumer of permission data.
pub struct PermissionResolver<S> {
    source: S,
    ttl: Duration,
    /// Only ever locked briefly; never across a fetch.
    cache: Mutex<HashMap<CacheKey, Slot>>,
}

impl<S: RolePermissionSource> PermissionResolver<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve the permission state for `user`. Never returns `Pending`.
    pub async fn resolve(&self, user: &User) -> Result<PermissionState, ResolveError> {
        if let Some(raw) = user.embedded_role_permissions() {
            return normalize(raw, PermissionOrigin::EmbeddedRole);
        }

        if let Some(role_id) = user.role_id {
            return self.resolve_remote(CacheKey {
                user_id: user.id,
                role_id,
            })
            .await;
        }

        if let Some(raw) = user.direct_permissions() {
            return normalize(raw, PermissionOrigin::UserRecord);
        }

        tracing::debug!(user_id = %user.id, "no permission data on user");
        Ok(PermissionState::Unresolvable)
    }

    /// Drop every cached entry (login, logout, identity change).
    pub async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }

    async fn resolve_remote(&self, key: CacheKey) -> Result<PermissionState, ResolveError> {
        let slot = self.cache.lock().await.entry(key).or_default().clone();

        // Concurrent lookups for the same identity wait here for the first
        // fetch and reuse its result. `invalidate` detaches the slot instead
        // of waiting, so a result landing after it is never seen again.
        let mut entry = slot.lock().await;

        let now = Utc::now();
        if let Some(hit) = entry.as_ref() {
            if now.signed_duration_since(hit.cached_at) < self.ttl {
                tracing::debug!(user_id = %key.user_id, role_id = %key.role_id, "role permissions cache hit");
                return Ok(hit.state.clone());
            }
        }

        let state = match self.source.my_role_permissions().await {
            Ok(response) => interpret(response)?,
            Err(err) => {
                tracing::warn!(
                    user_id = %key.user_id,
                    role_id = %key.role_id,
                    error = %err,
                    "role permission lookup failed; falling back to base menu"
                );
                // Not cached: the next navigation asks again.
                *entry = None;
                return Ok(PermissionState::BaseMenu(FallbackReason::FetchFailed(err.to_string())));
            }
        };

        *entry = Some(CachedState {
            state: state.clone(),
            cached_at: now,
        });
        Ok(state)
    }
}

fn interpret(response: MyRolePermissions) -> Result<PermissionState, ResolveError> {
    if !response.has_role {
        tracing::info!(reason = ?response.message, "no active custom role; using base menu");
        return Ok(PermissionState::BaseMenu(FallbackReason::NoActiveRole {
            message: response.message,
        }));
    }

    let raw = response
        .role
        .as_ref()
        .and_then(RoleSummary::raw_permissions)
        .ok_or_else(|| ResolveError::MalformedResponse("hasRole is true but role.permissions is missing".into()))?;

    normalize(raw, PermissionOrigin::RoleEndpoint)
}

fn normalize(raw: &Value, origin: PermissionOrigin) -> Result<PermissionState, ResolveError> {
    let map = PermissionMap::from_value(raw)
        .map_err(|source| ResolveError::CorruptPermissions { origin, source })?;
    tracing::debug!(%origin, visible = ?map.visible_modules(), "permissions resolved");
    Ok(PermissionState::resolved(map, origin))
}
