//! Session persistence: rehydration at startup, establish at login, clear at logout.

use jasmine_auth::{Session, User};

use crate::error::StorageError;
use crate::storage::SessionStorage;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Owns the persisted session and its in-memory mirror.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    current: Session,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            current: Session::anonymous(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn session(&self) -> &Session {
        &self.current
    }

    /// Rehydrate from storage.
    ///
    /// A token is trusted without a server round trip. A missing or
    /// unreadable user blob leaves the session logged in with no user.
    pub async fn bootstrap(&mut self) -> Result<&Session, StorageError> {
        let token = self.storage.get(TOKEN_KEY).await?;

        self.current = match token.filter(|t| !t.trim().is_empty()) {
            None => Session::anonymous(),
            Some(token) => {
                let user = match self.storage.get(USER_KEY).await? {
                    None => None,
                    Some(blob) => match serde_json::from_str::<User>(&blob) {
                        Ok(user) => Some(user),
                        Err(err) => {
                            tracing::warn!(error = %err, "cached user is unreadable; continuing without it");
                            None
                        }
                    },
                };
                Session::signed_in(token, user)
            }
        };

        tracing::debug!(
            logged_in = self.current.is_logged_in(),
            user_type = self.current.user_type.as_str(),
            "session rehydrated"
        );
        Ok(&self.current)
    }

    /// Persist a fresh login. Token and user are written together.
    pub async fn establish(&mut self, token: &str, mut user: User, user_type_hint: &str) -> Result<&Session, StorageError> {
        // Keep the resolved experience on the cached record so a reload
        // lands in the same place even if the backend put the hint elsewhere.
        if user.role.is_none() && user.account_type.is_none() {
            user.account_type = Some(user_type_hint.to_string());
        }

        let blob = serde_json::to_string(&user)
            .map_err(|e| StorageError::Unavailable(format!("failed to encode user: {e}")))?;
        self.storage
            .set_all(&[(TOKEN_KEY, token.to_string()), (USER_KEY, blob)])
            .await?;

        self.current = Session::signed_in(token, Some(user));
        Ok(&self.current)
    }

    /// Forget everything, persisted and in memory.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.current = Session::anonymous();
        self.storage.remove_all(&[TOKEN_KEY, USER_KEY]).await
    }
}
