use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::transport::Transport;
use crate::types::{AuthToken, Session, User};

const SIGNIN_PATH: &str = "/api/auth/signin";
const SIGNUP_PATH: &str = "/api/auth/signup";

/// Sign-in form.
#[derive(Debug, Clone, Serialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl SignupRequest {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
        }
    }
}

/// Token and profile issued by sign-in/sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: AuthToken,
    pub user: User,
}

/// Sign in and, on success, persist the session.
///
/// A 401 here is always [`AuthRejected`](crate::ErrorKind::AuthRejected).
pub async fn signin<T: Transport>(
    gateway: &Gateway<T>,
    credentials: &SigninRequest,
) -> ApiResult<User> {
    let response: AuthResponse = gateway.post(SIGNIN_PATH, credentials).await?;
    establish(gateway, response)
}

/// Create an account and, on success, persist the session.
pub async fn signup<T: Transport>(gateway: &Gateway<T>, data: &SignupRequest) -> ApiResult<User> {
    let response: AuthResponse = gateway.post(SIGNUP_PATH, data).await?;
    establish(gateway, response)
}

/// Local sign-out. The service keeps no session state, so nothing is sent.
pub fn logout<T: Transport>(gateway: &Gateway<T>) {
    gateway.session().logout();
}

fn establish<T: Transport>(gateway: &Gateway<T>, response: AuthResponse) -> ApiResult<User> {
    let user = response.user.clone();
    gateway.establish(Session::new(response.token, response.user))?;
    Ok(user)
}
