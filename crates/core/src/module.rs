//! The closed set of portal modules that role permissions refer to.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A portal module a custom role can grant visibility of.
///
/// Permission payloads may carry other keys; those never map to a
/// `ModuleKey` and are ignored by the permission map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKey {
    Dashboard,
    Products,
    Orders,
    Meetings,
    MarketReports,
    Payments,
    InvoiceToDelivery,
    Users,
    Roles,
}

impl ModuleKey {
    pub const ALL: [ModuleKey; 9] = [
        ModuleKey::Dashboard,
        ModuleKey::Products,
        ModuleKey::Orders,
        ModuleKey::Meetings,
        ModuleKey::MarketReports,
        ModuleKey::Payments,
        ModuleKey::InvoiceToDelivery,
        ModuleKey::Users,
        ModuleKey::Roles,
    ];

    /// Wire key as it appears in role permission payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKey::Dashboard => "dashboard",
            ModuleKey::Products => "products",
            ModuleKey::Orders => "orders",
            ModuleKey::Meetings => "meetings",
            ModuleKey::MarketReports => "market_reports",
            ModuleKey::Payments => "payments",
            ModuleKey::InvoiceToDelivery => "invoice_to_delivery",
            ModuleKey::Users => "users",
            ModuleKey::Roles => "roles",
        }
    }

    /// Human-readable module name.
    pub fn label(&self) -> &'static str {
        match self {
            ModuleKey::Dashboard => "Dashboard",
            ModuleKey::Products => "Products",
            ModuleKey::Orders => "Orders",
            ModuleKey::Meetings => "Meetings",
            ModuleKey::MarketReports => "Market Reports",
            ModuleKey::Payments => "Payments",
            ModuleKey::InvoiceToDelivery => "Invoice to Delivery",
            ModuleKey::Users => "Users",
            ModuleKey::Roles => "Roles",
        }
    }
}

impl core::fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKey::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::unknown_module(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_keys_round_trip_through_from_str() {
        for module in ModuleKey::ALL {
            assert_eq!(module.as_str().parse::<ModuleKey>().unwrap(), module);
        }
    }

    #[test]
    fn serde_uses_the_wire_keys() {
        let json = serde_json::to_string(&ModuleKey::InvoiceToDelivery).unwrap();
        assert_eq!(json, "\"invoice_to_delivery\"");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = "news".parse::<ModuleKey>().unwrap_err();
        assert_eq!(err, DomainError::UnknownModule("news".to_string()));
    }
}
