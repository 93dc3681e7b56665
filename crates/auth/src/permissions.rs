//! Module-level permission maps carried by custom roles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use jasmine_core::{DomainError, DomainResult, ModuleKey};

/// Grant for a single module.
///
/// Role editors also send `add`/`edit`/`delete` flags; nothing enforces
/// them, so only `view` is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleGrant {
    pub view: bool,
}

/// Normalized permission map of a role.
///
/// Built from either a JSON object or a JSON-encoded string. A module is
/// visible iff its entry is an object with `view === true`, or the legacy
/// bare `true`. Keys outside [`ModuleKey`] are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<ModuleKey, ModuleGrant>);

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map granting `view` on every listed module.
    pub fn viewing(modules: impl IntoIterator<Item = ModuleKey>) -> Self {
        let mut map = Self::new();
        for module in modules {
            map.set(module, true);
        }
        map
    }

    /// Normalize a raw permissions payload.
    ///
    /// Strings are decoded as JSON first; a string that does not decode to
    /// an object is corrupt role data and is reported, not defaulted.
    pub fn from_value(raw: &Value) -> DomainResult<Self> {
        match raw {
            Value::Object(entries) => Ok(Self::from_entries(entries)),
            Value::String(encoded) => {
                let decoded: Value = serde_json::from_str(encoded)
                    .map_err(|e| DomainError::corrupt_permissions(format!("invalid JSON: {e}")))?;
                match decoded {
                    Value::Object(entries) => Ok(Self::from_entries(&entries)),
                    other => Err(DomainError::corrupt_permissions(format!(
                        "expected an object, found {}",
                        kind_of(&other)
                    ))),
                }
            }
            other => Err(DomainError::corrupt_permissions(format!(
                "expected an object or JSON string, found {}",
                kind_of(other)
            ))),
        }
    }

    fn from_entries(entries: &Map<String, Value>) -> Self {
        let mut map = Self::new();
        for (key, grant) in entries {
            let Ok(module) = key.parse::<ModuleKey>() else {
                tracing::debug!(key = %key, "ignoring unknown permission key");
                continue;
            };
            map.set(module, grant_allows_view(grant));
        }
        map
    }

    pub fn set(&mut self, module: ModuleKey, view: bool) {
        self.0.insert(module, ModuleGrant { view });
    }

    /// `true` iff the role may view `module`.
    pub fn allows(&self, module: ModuleKey) -> bool {
        self.0.get(&module).is_some_and(|g| g.view)
    }

    /// Modules with `view` granted, in module order.
    pub fn visible_modules(&self) -> Vec<ModuleKey> {
        self.0
            .iter()
            .filter(|(_, g)| g.view)
            .map(|(m, _)| *m)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let entries = self
            .0
            .iter()
            .map(|(m, g)| (m.as_str().to_string(), serde_json::json!({ "view": g.view })))
            .collect::<Map<String, Value>>();
        Value::Object(entries)
    }

    /// JSON-encoded form, as stored by the backend.
    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }
}

impl<'de> Deserialize<'de> for PermissionMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        PermissionMap::from_value(&raw).map_err(serde::de::Error::custom)
    }
}

fn grant_allows_view(grant: &Value) -> bool {
    match grant {
        Value::Object(flags) => matches!(flags.get("view"), Some(Value::Bool(true))),
        Value::Bool(true) => true,
        _ => false,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn view_true_object_grants_access() {
        let map = PermissionMap::from_value(&json!({
            "orders": { "view": true, "add": false },
            "payments": { "view": false },
        }))
        .unwrap();

        assert!(map.allows(ModuleKey::Orders));
        assert!(!map.allows(ModuleKey::Payments));
        assert!(!map.allows(ModuleKey::Dashboard));
    }

    #[test]
    fn bare_true_is_a_legacy_grant() {
        let map = PermissionMap::from_value(&json!({ "meetings": true, "orders": false })).unwrap();
        assert!(map.allows(ModuleKey::Meetings));
        assert!(!map.allows(ModuleKey::Orders));
    }

    #[test]
    fn truthy_but_not_true_values_deny() {
        let map = PermissionMap::from_value(&json!({
            "orders": { "view": "true" },
            "products": { "view": 1 },
            "meetings": 1,
            "payments": "yes",
            "dashboard": null,
        }))
        .unwrap();

        assert!(map.visible_modules().is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let map = PermissionMap::from_value(&json!({ "news": { "view": true }, "orders": true })).unwrap();
        assert_eq!(map.visible_modules(), vec![ModuleKey::Orders]);
    }

    #[test]
    fn json_string_payloads_are_decoded() {
        let raw = Value::String(r#"{"market_reports":{"view":true}}"#.to_string());
        let map = PermissionMap::from_value(&raw).unwrap();
        assert!(map.allows(ModuleKey::MarketReports));
    }

    #[test]
    fn undecodable_string_is_corrupt_data() {
        let err = PermissionMap::from_value(&Value::String("{not json".into())).unwrap_err();
        assert!(matches!(err, DomainError::CorruptPermissions(_)));

        let err = PermissionMap::from_value(&Value::String("[1,2]".into())).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn non_object_payloads_are_corrupt_data() {
        for raw in [json!(true), json!(3), json!([]), Value::Null] {
            assert!(PermissionMap::from_value(&raw).is_err(), "{raw} should be rejected");
        }
    }

    fn arb_grant() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(|view| json!({ "view": view })),
            any::<bool>().prop_map(Value::Bool),
            Just(json!({ "view": "true" })),
            Just(json!({ "add": true })),
            any::<i64>().prop_map(|n| json!(n)),
            Just(Value::Null),
        ]
    }

    fn arb_payload() -> impl Strategy<Value = Map<String, Value>> {
        let key = prop_oneof![
            prop::sample::select(ModuleKey::ALL.to_vec()).prop_map(|m| m.as_str().to_string()),
            "[a-z_]{1,12}",
        ];
        prop::collection::btree_map(key, arb_grant(), 0..12)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        /// Decoding a payload from its JSON-string encoding yields the same
        /// visibility decision for every module as decoding the object.
        #[test]
        fn string_encoding_preserves_decisions(payload in arb_payload()) {
            let object = Value::Object(payload);
            let encoded = Value::String(object.to_string());

            let from_object = PermissionMap::from_value(&object).unwrap();
            let from_string = PermissionMap::from_value(&encoded).unwrap();

            for module in ModuleKey::ALL {
                prop_assert_eq!(from_object.allows(module), from_string.allows(module));
            }
        }

        #[test]
        fn normalized_map_survives_its_own_encoding(payload in arb_payload()) {
            let map = PermissionMap::from_value(&Value::Object(payload)).unwrap();
            let reparsed = PermissionMap::from_value(&Value::String(map.to_json_string())).unwrap();
            prop_assert_eq!(map, reparsed);
        }
    }
}
