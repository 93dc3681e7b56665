use jasmine_core::{RoleId, UserType};

use crate::{Session, User};

/// Who is asking, as far as route gating is concerned.
///
/// Admins never consult the fine-grained role system; customers carry the
/// optional custom role reference their permissions hang off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Principal<'a> {
    Anonymous,
    Admin {
        user: Option<&'a User>,
    },
    Customer {
        user: Option<&'a User>,
        role_id: Option<RoleId>,
    },
}

impl<'a> Principal<'a> {
    pub fn of(session: &'a Session) -> Self {
        if !session.is_logged_in() {
            return Principal::Anonymous;
        }
        let user = session.user.as_ref();
        match session.user_type {
            UserType::Admin => Principal::Admin { user },
            UserType::Customer => Principal::Customer {
                user,
                role_id: user.and_then(|u| u.role_id),
            },
        }
    }

    pub fn user_type(&self) -> Option<UserType> {
        match self {
            Principal::Anonymous => None,
            Principal::Admin { .. } => Some(UserType::Admin),
            Principal::Customer { .. } => Some(UserType::Customer),
        }
    }

    pub fn user(&self) -> Option<&'a User> {
        match self {
            Principal::Anonymous => None,
            Principal::Admin { user } | Principal::Customer { user, .. } => *user,
        }
    }
}
