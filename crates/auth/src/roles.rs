//! Custom role records managed from the admin console.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use jasmine_core::{DomainError, DomainResult, RoleId};

use crate::PermissionMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    #[default]
    Active,
    Inactive,
}

/// A custom role as returned by the role endpoints.
///
/// `permissions` stays raw: the backend returns it either as an object or
/// as a JSON-encoded string, and decoding errors must surface at the point
/// of use rather than poison the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub role_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: RoleStatus,
    #[serde(default)]
    pub permissions: Option<Value>,
}

impl Role {
    pub fn is_active(&self) -> bool {
        self.status == RoleStatus::Active
    }

    /// Decode the role's permissions. A role without permissions grants nothing.
    pub fn permission_map(&self) -> DomainResult<PermissionMap> {
        match &self.permissions {
            Some(raw) if !raw.is_null() => PermissionMap::from_value(raw),
            _ => Ok(PermissionMap::new()),
        }
    }
}

/// Role payload as embedded in a user record (`userRole`) or in the
/// "my role permissions" response. Only the permissions are guaranteed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleSummary {
    #[serde(default)]
    pub id: Option<RoleId>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Option<Value>,
}

impl RoleSummary {
    /// Raw permissions, if present and non-null.
    pub fn raw_permissions(&self) -> Option<&Value> {
        self.permissions.as_ref().filter(|v| !v.is_null())
    }
}

/// Create/update payload for a custom role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleDraft {
    pub role_name: String,
    pub description: Option<String>,
    pub status: RoleStatus,
    pub permissions: PermissionMap,
}

impl RoleDraft {
    pub fn new(role_name: impl Into<String>, permissions: PermissionMap) -> Self {
        Self {
            role_name: role_name.into(),
            description: None,
            status: RoleStatus::Active,
            permissions,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: RoleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.role_name.trim().is_empty() {
            return Err(DomainError::validation("role_name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jasmine_core::ModuleKey;
    use serde_json::json;

    #[test]
    fn role_accepts_string_encoded_permissions() {
        let role: Role = serde_json::from_value(json!({
            "id": "3",
            "role_name": "Buyer",
            "status": "active",
            "permissions": "{\"orders\":{\"view\":true}}",
        }))
        .unwrap();

        assert!(role.is_active());
        assert!(role.permission_map().unwrap().allows(ModuleKey::Orders));
    }

    #[test]
    fn corrupt_permissions_do_not_break_the_record() {
        let role: Role = serde_json::from_value(json!({
            "id": 4,
            "role_name": "Broken",
            "status": "inactive",
            "permissions": "{oops",
        }))
        .unwrap();

        assert!(!role.is_active());
        assert!(role.permission_map().is_err());
    }

    #[test]
    fn draft_requires_a_name() {
        let draft = RoleDraft::new("  ", PermissionMap::new());
        assert!(draft.validate().is_err());

        let draft = RoleDraft::new("Viewer", PermissionMap::viewing([ModuleKey::Dashboard]))
            .with_description("read only");
        assert!(draft.validate().is_ok());

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["permissions"]["dashboard"]["view"], json!(true));
        assert_eq!(body["status"], json!("active"));
    }
}
