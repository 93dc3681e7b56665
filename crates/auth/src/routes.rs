//! Portal route table.

use jasmine_core::{ModuleKey, UserType};

use crate::guard::RouteRequirement;

pub const LOGIN: &str = "/login";
pub const ROOT: &str = "/";
pub const ADMIN_LANDING: &str = "/admin/dashboard";
pub const CUSTOMER_LANDING: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub title: &'static str,
    pub requirement: RouteRequirement,
}

/// How a path is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// `/`: sends signed-in users to their landing page.
    Landing,
    Protected(&'static Route),
}

const fn admin(path: &'static str, title: &'static str) -> Route {
    Route {
        path,
        title,
        requirement: RouteRequirement::admin(),
    }
}

const fn customer(path: &'static str, title: &'static str, module: ModuleKey) -> Route {
    Route {
        path,
        title,
        requirement: RouteRequirement::customer(module),
    }
}

pub static ROUTES: &[Route] = &[
    // Admin console
    admin("/admin/dashboard", "Admin Dashboard"),
    admin("/admin/users", "User Management"),
    admin("/admin/roles", "Role Management"),
    admin("/admin/products", "Product Management"),
    admin("/admin/orders", "Order Management"),
    admin("/admin/meetings", "Meeting Minutes"),
    admin("/admin/payments", "Payments"),
    admin("/admin/invoice-to-delivery", "Invoice to Delivery"),
    admin("/admin/market-reports", "Market Reports"),
    admin("/admin/news", "News"),
    admin("/admin/settings", "Settings"),
    // Customer portal
    customer("/dashboard", "Dashboard", ModuleKey::Dashboard),
    customer("/orders", "My Orders", ModuleKey::Orders),
    customer("/products", "Product Catalogue", ModuleKey::Products),
    customer("/meetings", "Meeting Minutes", ModuleKey::Meetings),
    customer("/market-reports", "Market Reports", ModuleKey::MarketReports),
    customer("/payments", "Payments", ModuleKey::Payments),
    customer("/invoice-to-delivery", "Invoice to Delivery", ModuleKey::InvoiceToDelivery),
    customer("/users", "Team Members", ModuleKey::Users),
    customer("/roles", "Team Roles", ModuleKey::Roles),
    // Any signed-in user
    Route {
        path: "/profile",
        title: "My Profile",
        requirement: RouteRequirement::signed_in(),
    },
];

/// Landing page after login (and for `/`).
pub fn landing(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Admin => ADMIN_LANDING,
        UserType::Customer => CUSTOMER_LANDING,
    }
}

/// Find the route serving `path`.
///
/// Nested paths (`/orders/42`) are served by their closest registered
/// ancestor. Query strings and trailing slashes are ignored.
pub fn lookup(path: &str) -> Option<RouteAccess> {
    let path = normalize(path);

    if path == LOGIN {
        return Some(RouteAccess::Public);
    }
    if path == ROOT {
        return Some(RouteAccess::Landing);
    }

    ROUTES
        .iter()
        .filter(|r| {
            path == r.path
                || path
                    .strip_prefix(r.path)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|r| r.path.len())
        .map(RouteAccess::Protected)
}

/// Find a registered route by exact path.
pub fn find(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.path == path)
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { ROOT } else { trimmed }
}
