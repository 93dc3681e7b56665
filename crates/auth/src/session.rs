//! In-memory view of the signed-in session.

use jasmine_core::UserType;

use crate::User;

/// Signed-in state.
///
/// Logged-in status is derived from the bearer token, so a session can never
/// claim to be logged in without one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub user_type: UserType,
    pub user: Option<User>,
    token: Option<String>,
}

impl Session {
    /// Logged-out defaults.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session. Empty tokens are treated as absent.
    pub fn signed_in(token: impl Into<String>, user: Option<User>) -> Self {
        let token = Some(token.into()).filter(|t| !t.trim().is_empty());
        let user_type = user.as_ref().map(User::user_type).unwrap_or_default();
        Self {
            user_type,
            user,
            token,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.username.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jasmine_core::{CoarseRole, UserId};

    #[test]
    fn logged_in_implies_token() {
        assert!(!Session::anonymous().is_logged_in());
        assert!(!Session::signed_in("   ", None).is_logged_in());

        let session = Session::signed_in("abc", None);
        assert!(session.is_logged_in());
        assert_eq!(session.token(), Some("abc"));
    }

    #[test]
    fn user_type_follows_the_user_record() {
        let mut admin = User::new(UserId::new(1));
        admin.role = Some(CoarseRole::Admin);
        assert_eq!(Session::signed_in("t", Some(admin)).user_type, UserType::Admin);

        assert_eq!(Session::signed_in("t", None).user_type, UserType::Customer);
    }
}
