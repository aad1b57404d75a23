use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::http::HttpClient;
use crate::error::ApiError;
use crate::models::User;

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `data` of a successful `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub access_token: String,
    pub user: User,
}

pub async fn login(http: &HttpClient, credentials: &LoginCredentials) -> Result<LoginData, ApiError> {
    let envelope: Envelope<LoginData> = http.post("/auth/login", credentials).await?;
    Ok(envelope.data)
}

/// Log in and hand the token and profile to the client's session
pub async fn sign_in(http: &HttpClient, credentials: &LoginCredentials) -> Result<User, ApiError> {
    let data = login(http, credentials).await?;
    http.session().login(data.access_token, data.user.clone()).await;
    Ok(data.user)
}
