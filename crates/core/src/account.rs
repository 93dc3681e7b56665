//! Coarse account classification.
//!
//! Every user carries a coarse role string; the portal only distinguishes
//! two experiences from it (admin console vs customer portal).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which portal experience a session gets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    #[default]
    Customer,
}

impl UserType {
    /// Derive the user type from a login hint (`role` or `type` field).
    ///
    /// Anything other than `"admin"`, including a missing hint, is a
    /// customer session.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.map(|h| h.trim().to_ascii_lowercase()) {
            Some(h) if h == "admin" => UserType::Admin,
            _ => UserType::Customer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Customer => "customer",
        }
    }
}

impl core::fmt::Display for UserType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse role string stored on the user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CoarseRole {
    Admin,
    #[default]
    Customer,
    Manager,
    User,
    Other(String),
}

impl CoarseRole {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => CoarseRole::Admin,
            "customer" => CoarseRole::Customer,
            "manager" => CoarseRole::Manager,
            "user" => CoarseRole::User,
            _ => CoarseRole::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CoarseRole::Admin => "admin",
            CoarseRole::Customer => "customer",
            CoarseRole::Manager => "manager",
            CoarseRole::User => "user",
            CoarseRole::Other(s) => s,
        }
    }

    pub fn user_type(&self) -> UserType {
        UserType::from_hint(Some(self.as_str()))
    }
}

impl core::fmt::Display for CoarseRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CoarseRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CoarseRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CoarseRole::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_hint_defaults_to_customer() {
        assert_eq!(UserType::from_hint(None), UserType::Customer);
        assert_eq!(UserType::from_hint(Some("")), UserType::Customer);
        assert_eq!(UserType::from_hint(Some("manager")), UserType::Customer);
        assert_eq!(UserType::from_hint(Some(" Admin ")), UserType::Admin);
    }

    #[test]
    fn coarse_role_keeps_unknown_values() {
        let role: CoarseRole = serde_json::from_str("\"auditor\"").unwrap();
        assert_eq!(role, CoarseRole::Other("auditor".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"auditor\"");
        assert_eq!(role.user_type(), UserType::Customer);
        assert_eq!(CoarseRole::Admin.user_type(), UserType::Admin);
    }
}
