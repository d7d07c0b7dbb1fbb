use parking_lot::RwLock;

use crate::{
    client::ApiClient,
    dto::auth::{
        AuthTokens, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    },
    error::ClientResult,
    models::User,
    response::ApiResult,
    services::auth_service,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthState {
    pub loading: bool,
    pub user: Option<User>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Current user and token lifecycle. Writes happen only through the action
/// methods below. Tokens are refreshed reactively by [`ApiClient`] after a
/// 401, never ahead of expiry.
pub struct AuthSession {
    client: ApiClient,
    state: RwLock<AuthState>,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(AuthState {
                loading: true,
                user: None,
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.read().user.as_ref().is_some_and(User::is_admin)
    }

    /// Hydrates the user from a stored token. Any failure wipes stored tokens
    /// and leaves the session unauthenticated.
    pub async fn initialize(&self) -> ClientResult<()> {
        let user = match self.client.tokens().access_token().await? {
            None => None,
            Some(_) => match auth_service::me(&self.client).await {
                Ok(Ok(user)) => Some(user),
                Ok(Err(failure)) => {
                    tracing::info!(code = %failure.code, "stored session rejected, signing out");
                    self.client.tokens().clear().await?;
                    None
                }
                Err(err) => {
                    tracing::info!(error = %err, "could not restore session, signing out");
                    self.client.tokens().clear().await?;
                    None
                }
            },
        };
        *self.state.write() = AuthState {
            loading: false,
            user,
        };
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<ApiResult<User>> {
        let payload = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let reply = auth_service::login(&self.client, &payload).await?;
        self.accept_tokens(reply).await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> ClientResult<ApiResult<User>> {
        let reply = auth_service::register(&self.client, payload).await?;
        self.accept_tokens(reply).await
    }

    async fn accept_tokens(&self, reply: ApiResult<AuthTokens>) -> ClientResult<ApiResult<User>> {
        let tokens = match reply {
            Ok(tokens) => tokens,
            Err(failure) => return Ok(Err(failure)),
        };
        self.client
            .tokens()
            .save(&tokens.token, tokens.refresh_token.as_deref())
            .await?;
        tracing::info!(user_id = tokens.user.id, role = ?tokens.user.role, "signed in");
        *self.state.write() = AuthState {
            loading: false,
            user: Some(tokens.user.clone()),
        };
        Ok(Ok(tokens.user))
    }

    /// Tells the API best-effort, then always drops local credentials.
    pub async fn logout(&self) -> ClientResult<()> {
        match auth_service::logout(&self.client).await {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => tracing::debug!(code = %failure.code, "logout rejected by api"),
            Err(err) => tracing::debug!(error = %err, "logout request failed"),
        }
        self.client.tokens().clear().await?;
        *self.state.write() = AuthState {
            loading: false,
            user: None,
        };
        Ok(())
    }

    pub async fn refresh_profile(&self) -> ClientResult<ApiResult<User>> {
        let reply = auth_service::me(&self.client).await?;
        if let Ok(user) = &reply {
            self.state.write().user = Some(user.clone());
        }
        Ok(reply)
    }

    pub async fn update_profile(
        &self,
        payload: &UpdateProfileRequest,
    ) -> ClientResult<ApiResult<User>> {
        let reply = auth_service::update_profile(&self.client, payload).await?;
        if let Ok(user) = &reply {
            self.state.write().user = Some(user.clone());
        }
        Ok(reply)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<ApiResult<()>> {
        let payload = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        auth_service::change_password(&self.client, &payload).await
    }
}
