//! The portal facade: one session, one resolver, shared by guard and menu.

use jasmine_auth::routes::{self, RouteAccess, LOGIN};
use jasmine_auth::{
    GateOutcome, GatePolicy, Menu, PermissionResolver, PermissionState, Principal, Session,
};

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::http::{ApiClient, Credentials};
use crate::session::SessionStore;
use crate::storage::SessionStorage;

pub struct Portal<S> {
    api: ApiClient,
    sessions: SessionStore<S>,
    resolver: PermissionResolver<ApiClient>,
    policy: GatePolicy,
}

impl<S: SessionStorage> Portal<S> {
    pub fn new(api: ApiClient, storage: S, cache_ttl: chrono::Duration, policy: GatePolicy) -> Self {
        Self {
            resolver: PermissionResolver::new(api.clone(), cache_ttl),
            api,
            sessions: SessionStore::new(storage),
            policy,
        }
    }

    pub fn from_config(config: &PortalConfig, storage: S) -> Result<Self, PortalError> {
        let api = ApiClient::new(config)?;
        Ok(Self::new(api, storage, config.cache_ttl(), config.gate_policy))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn session(&self) -> &Session {
        self.sessions.session()
    }

    /// Application start: rehydrate the session and arm the HTTP client.
    pub async fn bootstrap(&mut self) -> Result<&Session, PortalError> {
        self.sessions.bootstrap().await?;
        match self.sessions.session().token() {
            Some(token) => self.api.set_token(token),
            None => self.api.clear_token(),
        }
        Ok(self.sessions.session())
    }

    /// Sign in and return the landing route for the account.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&'static str, PortalError> {
        let data = self.api.login(&Credentials::new(username, password)).await?;
        let user_type = data.user_type();

        self.sessions
            .establish(&data.token, data.user, user_type.as_str())
            .await?;
        self.api.set_token(&data.token);
        self.resolver.invalidate().await;

        tracing::info!(username, user_type = user_type.as_str(), "signed in");
        Ok(routes::landing(user_type))
    }

    /// Sign out. The server call is best effort; local state is always cleared.
    pub async fn logout(&mut self) -> Result<&'static str, PortalError> {
        if self.sessions.session().is_logged_in() {
            if let Err(err) = self.api.logout().await {
                tracing::warn!(error = %err, "server logout failed; clearing local session anyway");
            }
        }

        self.api.clear_token();
        self.resolver.invalidate().await;
        self.sessions.clear().await?;

        tracing::info!("signed out");
        Ok(LOGIN)
    }

    /// Permission state for the current session.
    ///
    /// Only customers with an assigned custom role consult the resolver;
    /// everyone else is `Unresolvable`, which the guard never reads for them.
    pub async fn permission_state(&self) -> Result<PermissionState, PortalError> {
        match Principal::of(self.sessions.session()) {
            Principal::Customer {
                user: Some(user),
                role_id: Some(_),
            } => Ok(self.resolver.resolve(user).await?),
            _ => Ok(PermissionState::Unresolvable),
        }
    }

    /// Decide what navigating to `path` shows.
    ///
    /// The route is classified first so routes without a module requirement
    /// never depend on permission data.
    pub async fn open(&self, path: &str) -> Result<GateOutcome, PortalError> {
        let gated = matches!(
            routes::lookup(path),
            Some(RouteAccess::Protected(route)) if route.requirement.permission.is_some()
        );
        let permissions = if gated {
            self.permission_state().await?
        } else {
            PermissionState::Unresolvable
        };

        let outcome = jasmine_auth::route_outcome(self.session(), path, &permissions, self.policy);
        tracing::debug!(path, outcome = ?outcome, "route evaluated");
        Ok(outcome)
    }

    pub async fn menu(&self) -> Result<Menu, PortalError> {
        let permissions = self.permission_state().await?;
        Ok(jasmine_auth::build_menu(self.session(), &permissions, self.policy))
    }
}
