//! Portal user record, as returned at login and cached in the session store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use jasmine_core::{CoarseRole, RoleId, UserId, UserType};

use crate::roles::RoleSummary;

/// A portal user.
///
/// The backend denormalizes role data in two places: an embedded
/// `userRole` and a top-level `permissions`. Both are kept raw and only
/// interpreted by the permission resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<CoarseRole>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "RoleId::deserialize_assigned",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_id: Option<RoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,
    #[serde(
        rename = "userRole",
        alias = "user_role",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_role: Option<RoleSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Value>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            username: None,
            email: None,
            role: None,
            account_type: None,
            role_id: None,
            customer_code: None,
            user_role: None,
            permissions: None,
        }
    }

    /// Portal experience for this account: `role`, then `type`, else customer.
    pub fn user_type(&self) -> UserType {
        let hint = self
            .role
            .as_ref()
            .map(|r| r.as_str())
            .or(self.account_type.as_deref());
        UserType::from_hint(hint)
    }

    pub fn has_assigned_role(&self) -> bool {
        self.role_id.is_some()
    }

    /// `userRole.permissions`, if the login response embedded it.
    pub fn embedded_role_permissions(&self) -> Option<&Value> {
        self.user_role.as_ref().and_then(|r| r.raw_permissions())
    }

    /// Top-level `permissions`, the oldest denormalized location.
    pub fn direct_permissions(&self) -> Option<&Value> {
        self.permissions.as_ref().filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_user_without_role_or_type_is_a_customer() {
        let user: User = serde_json::from_value(json!({ "id": 1, "username": "acme" })).unwrap();
        assert_eq!(user.user_type(), UserType::Customer);
    }

    #[test]
    fn type_field_is_consulted_when_role_is_missing() {
        let user: User = serde_json::from_value(json!({ "id": 1, "type": "admin" })).unwrap();
        assert_eq!(user.user_type(), UserType::Admin);

        let user: User =
            serde_json::from_value(json!({ "id": 1, "role": "customer", "type": "admin" })).unwrap();
        assert_eq!(user.user_type(), UserType::Customer);
    }

    #[test]
    fn embedded_role_is_read_from_camel_case_key() {
        let user: User = serde_json::from_value(json!({
            "id": 9,
            "role": "customer",
            "role_id": 2,
            "userRole": { "id": 2, "permissions": { "orders": { "view": true } } },
        }))
        .unwrap();

        assert!(user.has_assigned_role());
        assert!(user.embedded_role_permissions().is_some());
        assert!(user.direct_permissions().is_none());
    }

    #[test]
    fn cached_blob_round_trips() {
        let user: User = serde_json::from_value(json!({
            "id": 9,
            "username": "acme",
            "role": "customer",
            "role_id": "2",
            "customer_code": "C-100",
            "permissions": null,
        }))
        .unwrap();

        let blob = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&blob).unwrap();
        assert_eq!(back, user);
        assert_eq!(back.role_id, Some(RoleId::new(2)));
    }
}
