use crate::models::{Role, User};

/// Where the session stands. Screens and the router only ever read this.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Stored token not yet checked; render a loading indicator.
    Bootstrapping,
    Unauthenticated,
    Authenticated(User),
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Bootstrapping)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Bootstrapping => "bootstrapping",
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticated(_) => "authenticated",
        }
    }
}

/// Outcomes reported by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// Bootstrap found nothing in storage.
    NoStoredToken,
    /// Bootstrap profile fetch succeeded.
    SessionRestored(User),
    /// Bootstrap profile fetch failed; the session has been wiped.
    SessionRejected,
    LoggedIn(User),
    LoginFailed,
    LoggedOut,
    /// A later profile fetch or edit returned a fresh user record.
    UserRefreshed(User),
}

/// Pure transition function.
///
/// Bootstrap events only apply while bootstrapping, so a slow startup
/// check can never overwrite the result of an explicit login or logout.
/// A refreshed user only replaces an existing one; it never signs anybody in.
pub fn reduce(state: &AuthState, event: AuthEvent) -> AuthState {
    match (state, event) {
        (AuthState::Bootstrapping, AuthEvent::NoStoredToken)
        | (AuthState::Bootstrapping, AuthEvent::SessionRejected) => AuthState::Unauthenticated,
        (AuthState::Bootstrapping, AuthEvent::SessionRestored(user)) => {
            AuthState::Authenticated(user)
        }
        (_, AuthEvent::LoggedIn(user)) => AuthState::Authenticated(user),
        (_, AuthEvent::LoginFailed) | (_, AuthEvent::LoggedOut) => AuthState::Unauthenticated,
        (AuthState::Authenticated(_), AuthEvent::UserRefreshed(user)) => {
            AuthState::Authenticated(user)
        }
        (current, _) => current.clone(),
    }
}
