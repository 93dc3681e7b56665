//! Strongly-typed identifiers used across the portal.
//!
//! The backend emits numeric ids, but some endpoints serialize them as
//! strings; both forms deserialize to the same newtype.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

/// Identifier of a portal user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a custom (fine-grained) role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoleId(i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match RawId::deserialize(deserializer)? {
                    RawId::Int(v) => Ok(Self(v)),
                    RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

impl_int_newtype!(UserId, "UserId");
impl_int_newtype!(RoleId, "RoleId");

impl RoleId {
    /// Read an optional role reference the way the backend means it:
    /// `null`, `0` and `""` all mean "no custom role assigned".
    pub fn deserialize_assigned<'de, D>(deserializer: D) -> Result<Option<RoleId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawId>::deserialize(deserializer)?;
        match raw {
            None | Some(RawId::Int(0)) => Ok(None),
            Some(RawId::Int(v)) => Ok(Some(RoleId(v))),
            Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(RawId::Text(s)) => {
                let id: RoleId = s.parse().map_err(serde::de::Error::custom)?;
                Ok((id.0 != 0).then_some(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "RoleId::deserialize_assigned")]
        role_id: Option<RoleId>,
    }

    fn role_id_of(value: serde_json::Value) -> Option<RoleId> {
        serde_json::from_value::<Holder>(value).unwrap().role_id
    }

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let a: UserId = serde_json::from_value(json!(42)).unwrap();
        let b: UserId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get(), 42);
        assert!(serde_json::from_value::<UserId>(json!("forty-two")).is_err());
    }

    #[test]
    fn falsy_role_references_mean_unassigned() {
        assert_eq!(role_id_of(json!({})), None);
        assert_eq!(role_id_of(json!({ "role_id": null })), None);
        assert_eq!(role_id_of(json!({ "role_id": 0 })), None);
        assert_eq!(role_id_of(json!({ "role_id": "" })), None);
        assert_eq!(role_id_of(json!({ "role_id": "0" })), None);
        assert_eq!(role_id_of(json!({ "role_id": 7 })), Some(RoleId::new(7)));
        assert_eq!(role_id_of(json!({ "role_id": "7" })), Some(RoleId::new(7)));
    }

    #[test]
    fn from_str_reports_the_type_name() {
        let err = "x".parse::<RoleId>().unwrap_err();
        assert!(err.to_string().contains("RoleId"));
    }
}
