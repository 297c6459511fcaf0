use tokio::sync::watch;
use validator::Validate;

use super::state::{reduce, AuthEvent, AuthState};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::models::{Credentials, PasswordChange, RefreshedToken, TokenPair, User, UserPatch};

const TOKEN_PATH: &str = "/token/";
const TOKEN_REFRESH_PATH: &str = "/token/refresh/";
const ME_PATH: &str = "/users/me/";
const CHANGE_PASSWORD_PATH: &str = "/users/change-password/";

/// Owns the session. The only writer of [`AuthState`].
pub struct AuthController {
    api: ApiClient,
    state: watch::Sender<AuthState>,
}

impl AuthController {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthState::Bootstrapping);
        Self { api, state }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Observe transitions without being able to cause them.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    fn apply(&self, event: AuthEvent) {
        self.state.send_modify(|state| {
            let next = reduce(state, event);
            if next.name() != state.name() {
                tracing::info!(from = state.name(), to = next.name(), "Session state changed");
            }
            *state = next;
        });
    }

    /// Drop tokens from storage and from the client. Storage failures are
    /// logged; the in-memory session is gone either way.
    fn wipe_session(&self) {
        self.api.clear_default_token();
        if let Err(e) = self.api.store().clear() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
    }

    /// Resolve the startup state from the stored token.
    pub async fn bootstrap(&self) -> AuthState {
        let Some(token) = self.api.store().get().filter(|t| !t.is_empty()) else {
            tracing::debug!("No stored session");
            self.apply(AuthEvent::NoStoredToken);
            return self.state();
        };

        self.api.set_default_token(&token);
        match self.api.get::<User>(ME_PATH).await {
            Ok(user) => {
                tracing::info!(user = %user.username, role = %user.role, "Session restored");
                self.apply(AuthEvent::SessionRestored(user));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session rejected");
                self.wipe_session();
                self.apply(AuthEvent::SessionRejected);
            }
        }
        self.state()
    }

    /// Exchange credentials for a session. Every failure looks the same to
    /// the caller: `None`, with storage empty.
    pub async fn login(&self, username: &str, password: &str) -> Option<User> {
        let mut pending = PendingLogin {
            auth: self,
            settled: false,
        };
        let outcome = self.try_login(username, password).await;
        pending.settled = true;

        match outcome {
            Ok(user) => {
                tracing::info!(user = %user.username, role = %user.role, "Logged in");
                self.apply(AuthEvent::LoggedIn(user.clone()));
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.wipe_session();
                self.apply(AuthEvent::LoginFailed);
                None
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<User> {
        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate()?;

        // A stale bearer header would make the token endpoint answer 401.
        self.wipe_session();

        let tokens: TokenPair = self.api.post(TOKEN_PATH, &credentials).await?;
        self.api.set_default_token(&tokens.access);
        let user = self.api.get::<User>(ME_PATH).await?;
        // Tokens reach storage only once the profile is confirmed.
        self.api.store().set(&tokens.access, &tokens.refresh)?;
        Ok(user)
    }

    /// Forget the session locally. No server call is made.
    pub fn logout(&self) -> Result<()> {
        self.api.clear_default_token();
        let cleared = self.api.store().clear();
        self.apply(AuthEvent::LoggedOut);
        tracing::info!("Logged out");
        cleared
    }

    /// Re-pull the current user. A failure is reported but keeps the session.
    pub async fn refetch_user(&self) -> Result<User> {
        let user: User = self.api.get(ME_PATH).await?;
        self.apply(AuthEvent::UserRefreshed(user.clone()));
        Ok(user)
    }

    /// Trade the stored refresh token for a new access token. Only runs
    /// when asked; 401s elsewhere never trigger it.
    pub async fn refresh_access_token(&self) -> Result<()> {
        let refresh = self
            .api
            .store()
            .refresh_token()
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::NotAuthenticated)?;

        let body = serde_json::json!({ "refresh": refresh });
        let token: RefreshedToken = self.api.post(TOKEN_REFRESH_PATH, &body).await?;
        let next_refresh = token.refresh.as_deref().unwrap_or(&refresh);
        self.api.store().set(&token.access, next_refresh)?;
        self.api.set_default_token(&token.access);
        tracing::info!("Access token refreshed");
        Ok(())
    }

    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User> {
        if patch.is_empty() {
            return Err(ClientError::InvalidInput("Nothing to update".to_string()));
        }
        patch.validate()?;
        let user: User = self.api.patch(ME_PATH, patch).await?;
        self.apply(AuthEvent::UserRefreshed(user.clone()));
        Ok(user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        change.validate()?;
        let _: serde_json::Value = self.api.post(CHANGE_PASSWORD_PATH, change).await?;
        tracing::info!("Password changed");
        Ok(())
    }
}

/// Undoes a login that was abandoned mid-flight, e.g. by a cancelled scope.
struct PendingLogin<'a> {
    auth: &'a AuthController,
    settled: bool,
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Login abandoned");
            self.auth.wipe_session();
            self.auth.apply(AuthEvent::LoginFailed);
        }
    }
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("api", &self.api)
            .field("state", &self.state.borrow().name())
            .finish()
    }
}
