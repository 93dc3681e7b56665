//! HTTP client for the portal backend.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use jasmine_auth::{MyRolePermissions, Role, RoleDraft, RolePermissionSource, User};
use jasmine_core::{CoarseRole, RoleId, UserId, UserType};

use crate::config::PortalConfig;
use crate::envelope;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
    /// Some deployments put the coarse role next to the user instead of on it.
    #[serde(default)]
    pub role: Option<CoarseRole>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

impl LoginData {
    /// `user.role`, then `user.type`, then the payload-level hints, else customer.
    pub fn user_type(&self) -> UserType {
        let hint = self
            .user
            .role
            .as_ref()
            .map(CoarseRole::as_str)
            .or(self.user.account_type.as_deref())
            .or(self.role.as_ref().map(CoarseRole::as_str))
            .or(self.account_type.as_deref());
        UserType::from_hint(hint)
    }
}

/// Backend client. Clones share the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &PortalConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ClientError::InvalidResponse(format!("{status}: {e}")))?
        };
        envelope::decode(body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::DELETE, path)).await
    }

    // ---- endpoints ----

    /// `POST /login`. Does not touch the stored token; the caller decides.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<LoginData> {
        let data: LoginData = self.post("login", credentials).await?;
        if data.token.trim().is_empty() {
            return Err(ClientError::InvalidResponse("login succeeded without a token".into()));
        }
        Ok(data)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let _: Value = self.send(self.request(Method::POST, "logout")).await?;
        Ok(())
    }

    pub async fn my_role_permissions(&self) -> ClientResult<MyRolePermissions> {
        self.get("roles/my-permissions").await
    }

    pub async fn list_roles(&self) -> ClientResult<Vec<Role>> {
        self.get("roles").await
    }

    pub async fn get_role(&self, id: RoleId) -> ClientResult<Role> {
        self.get(&format!("roles/{id}")).await
    }

    pub async fn create_role(&self, draft: &RoleDraft) -> ClientResult<Role> {
        draft.validate().map_err(|e| ClientError::Validation(e.to_string()))?;
        self.post("roles", draft).await
    }

    pub async fn update_role(&self, id: RoleId, draft: &RoleDraft) -> ClientResult<Role> {
        draft.validate().map_err(|e| ClientError::Validation(e.to_string()))?;
        self.put(&format!("roles/{id}"), draft).await
    }

    pub async fn delete_role(&self, id: RoleId) -> ClientResult<()> {
        let _: Value = self.delete(&format!("roles/{id}")).await?;
        Ok(())
    }

    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get("users").await
    }

    pub async fn get_user(&self, id: UserId) -> ClientResult<User> {
        self.get(&format!("users/{id}")).await
    }
}

#[async_trait]
impl RolePermissionSource for ApiClient {
    type Error = ClientError;

    async fn my_role_permissions(&self) -> Result<MyRolePermissions, Self::Error> {
        ApiClient::my_role_permissions(self).await
    }
}

fn status_error(status: StatusCode, text: &str) -> ClientError {
    let message = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| envelope::error_message(&body))
        .unwrap_or_else(|| text.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
        _ => ClientError::Api(status.as_u16(), message),
    }
}
