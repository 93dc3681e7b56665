//! Sidebar navigation.
//!
//! Customer entries are filtered through [`guard::route_outcome`], so a link
//! is visible exactly when following it would render the page.

use serde::Serialize;

use jasmine_core::{ModuleKey, UserType};

use crate::guard::{self, GatePolicy};
use crate::resolver::PermissionState;
use crate::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub path: &'static str,
    pub permission: Option<ModuleKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub title: &'static str,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Menu {
    pub sections: Vec<MenuSection>,
}

impl Menu {
    pub fn entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

const fn entry(
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    path: &'static str,
    permission: Option<ModuleKey>,
) -> MenuEntry {
    MenuEntry {
        id,
        label,
        icon,
        path,
        permission,
    }
}

pub static ADMIN_SECTIONS: &[(&str, &[MenuEntry])] = &[
    ("Main", &[entry("admin-dashboard", "Dashboard", "home", "/admin/dashboard", None)]),
    (
        "Admin Tools",
        &[
            entry("admin-users", "Users", "users", "/admin/users", None),
            entry("admin-roles", "Roles & Permissions", "shield", "/admin/roles", None),
        ],
    ),
    (
        "Business Operations",
        &[
            entry("admin-products", "Products", "package", "/admin/products", None),
            entry("admin-orders", "Orders", "shopping-cart", "/admin/orders", None),
            entry("admin-meetings", "Meetings", "calendar", "/admin/meetings", None),
            entry("admin-payments", "Payments", "credit-card", "/admin/payments", None),
            entry(
                "admin-invoice-to-delivery",
                "Invoice to Delivery",
                "truck",
                "/admin/invoice-to-delivery",
                None,
            ),
            entry("admin-market-reports", "Market Reports", "trending-up", "/admin/market-reports", None),
        ],
    ),
    (
        "System",
        &[
            entry("admin-news", "News", "newspaper", "/admin/news", None),
            entry("admin-settings", "Settings", "settings", "/admin/settings", None),
        ],
    ),
];

/// Customer base list, in display order.
pub static CUSTOMER_ENTRIES: &[MenuEntry] = &[
    entry("dashboard", "Dashboard", "home", "/dashboard", Some(ModuleKey::Dashboard)),
    entry("orders", "My Orders", "shopping-cart", "/orders", Some(ModuleKey::Orders)),
    entry("products", "Products", "package", "/products", Some(ModuleKey::Products)),
    entry("meetings", "Meetings", "calendar", "/meetings", Some(ModuleKey::Meetings)),
    entry(
        "market-reports",
        "Market Reports",
        "trending-up",
        "/market-reports",
        Some(ModuleKey::MarketReports),
    ),
    entry("payments", "Payments", "credit-card", "/payments", Some(ModuleKey::Payments)),
    entry(
        "invoice-to-delivery",
        "Invoice to Delivery",
        "truck",
        "/invoice-to-delivery",
        Some(ModuleKey::InvoiceToDelivery),
    ),
    entry("users", "Team Members", "users", "/users", Some(ModuleKey::Users)),
    entry("roles", "Team Roles", "shield", "/roles", Some(ModuleKey::Roles)),
];

const CUSTOMER_SECTION: &str = "Portal";

/// Build the sidebar for `session` given the shared permission state.
pub fn build_menu(session: &Session, permissions: &PermissionState, policy: GatePolicy) -> Menu {
    if !session.is_logged_in() {
        return Menu::default();
    }

    match session.user_type {
        UserType::Admin => Menu {
            sections: ADMIN_SECTIONS
                .iter()
                .map(|&(title, entries)| MenuSection {
                    title,
                    entries: entries.to_vec(),
                })
                .collect(),
        },
        UserType::Customer => {
            let entries: Vec<MenuEntry> = CUSTOMER_ENTRIES
                .iter()
                .filter(|e| guard::route_outcome(session, e.path, permissions, policy).renders_content())
                .copied()
                .collect();

            tracing::debug!(
                visible = entries.len(),
                total = CUSTOMER_ENTRIES.len(),
                "customer menu built"
            );

            if entries.is_empty() {
                return Menu::default();
            }
            Menu {
                sections: vec![MenuSection {
                    title: CUSTOMER_SECTION,
                    entries,
                }],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{FallbackReason, PermissionOrigin};
    use crate::routes::{self, RouteAccess};
    use crate::{PermissionMap, User};
    use jasmine_core::{CoarseRole, RoleId, UserId};
    use proptest::prelude::*;

    fn customer(role_id: Option<i64>) -> Session {
        let mut user = User::new(UserId::new(10));
        user.role = Some(CoarseRole::Customer);
        user.role_id = role_id.map(RoleId::new);
        Session::signed_in("token", Some(user))
    }

    fn admin() -> Session {
        let mut user = User::new(UserId::new(1));
        user.role = Some(CoarseRole::Admin);
        Session::signed_in("token", Some(user))
    }

    fn ids(menu: &Menu) -> Vec<&'static str> {
        menu.entries().map(|e| e.id).collect()
    }

    #[test]
    fn every_menu_path_is_a_registered_route() {
        let all = ADMIN_SECTIONS
            .iter()
            .flat_map(|(_, entries)| entries.iter())
            .chain(CUSTOMER_ENTRIES.iter());
        for e in all {
            assert!(
                matches!(routes::lookup(e.path), Some(RouteAccess::Protected(r)) if r.path == e.path),
                "{} is not routed",
                e.path
            );
        }
    }

    #[test]
    fn admin_menu_is_static_and_sectioned() {
        let menu = build_menu(&admin(), &PermissionState::Unresolvable, GatePolicy::FailClosed);
        let titles: Vec<_> = menu.sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Main", "Admin Tools", "Business Operations", "System"]);
        assert!(ids(&menu).contains(&"admin-roles"));
    }

    #[test]
    fn anonymous_sessions_get_no_menu() {
        assert!(build_menu(&Session::anonymous(), &PermissionState::Pending, GatePolicy::FailOpen).is_empty());
    }

    #[test]
    fn customer_menu_keeps_base_order_and_filters_by_view() {
        let state = PermissionState::resolved(PermissionMap::viewing([
            ModuleKey::Payments,
            ModuleKey::Dashboard,
            ModuleKey::Orders,
        ]), PermissionOrigin::RoleEndpoint);
        let menu = build_menu(&customer(Some(4)), &state, GatePolicy::FailOpen);
        assert_eq!(ids(&menu), vec!["dashboard", "orders", "payments"]);
    }

    #[test]
    fn fallback_shows_the_unfiltered_base_list_when_fail_open() {
        let state = PermissionState::BaseMenu(FallbackReason::NoActiveRole { message: None });
        let menu = build_menu(&customer(Some(4)), &state, GatePolicy::FailOpen);
        assert_eq!(menu.entries().count(), CUSTOMER_ENTRIES.len());

        let menu = build_menu(&customer(Some(4)), &state, GatePolicy::FailClosed);
        assert!(menu.is_empty());
    }

    #[test]
    fn customer_without_role_sees_no_gated_links() {
        let state = PermissionState::resolved(PermissionMap::viewing(ModuleKey::ALL), PermissionOrigin::RoleEndpoint);
        assert!(build_menu(&customer(None), &state, GatePolicy::FailOpen).is_empty());
    }

    fn arb_state() -> impl Strategy<Value = PermissionState> {
        prop_oneof![
            Just(PermissionState::Pending),
            Just(PermissionState::Unresolvable),
            Just(PermissionState::BaseMenu(FallbackReason::FetchFailed("down".into()))),
            prop::collection::vec(any::<bool>(), ModuleKey::ALL.len()).prop_map(|grants| {
                let mut map = PermissionMap::new();
                for (module, view) in ModuleKey::ALL.into_iter().zip(grants) {
                    map.set(module, view);
                }
                PermissionState::resolved(map, PermissionOrigin::RoleEndpoint)
            }),
        ]
    }

    proptest! {
        /// No visible-but-forbidden links: every menu entry renders when followed.
        #[test]
        fn menu_never_shows_a_forbidden_link(
            state in arb_state(),
            role_id in prop::option::of(1i64..50),
            as_admin in any::<bool>(),
            policy in prop_oneof![Just(GatePolicy::FailOpen), Just(GatePolicy::FailClosed)],
        ) {
            let session = if as_admin { admin() } else { customer(role_id) };
            let menu = build_menu(&session, &state, policy);

            for e in menu.entries() {
                let outcome = guard::route_outcome(&session, e.path, &state, policy);
                prop_assert!(outcome.renders_content(), "{} shown but gated: {:?}", e.path, outcome);
            }
        }

        /// With a resolved map, the customer menu is exactly the viewable modules.
        #[test]
        fn resolved_menu_matches_visible_modules(
            grants in prop::collection::vec(any::<bool>(), ModuleKey::ALL.len()),
        ) {
            let mut map = PermissionMap::new();
            for (module, view) in ModuleKey::ALL.into_iter().zip(grants) {
                map.set(module, view);
            }
            let menu = build_menu(&customer(Some(2)), &PermissionState::resolved(map.clone(), PermissionOrigin::RoleEndpoint), GatePolicy::FailOpen);

            let mut shown: Vec<ModuleKey> = menu.entries().filter_map(|e| e.permission).collect();
            shown.sort();
            prop_assert_eq!(shown, map.visible_modules());
        }
    }
}
