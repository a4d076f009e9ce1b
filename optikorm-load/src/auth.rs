//! Credential bootstrap
//!
//! Every simulated user registers a fresh admin account. When registration does not yield a
//! token, one login with the same credentials is attempted; when that fails too the session
//! continues anonymously.
use crate::api::{Credentials, TokenResponse};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::requests;
use reqwest::header::HeaderValue;
#[allow(unused)]
use tracing::{debug, info, warn};

/// Validated `Authorization` header value for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: HeaderValue,
}

impl AuthToken {
    pub fn new(token: &str) -> Result<Self, ApiError> {
        let mut value =
            HeaderValue::from_str(&format!("Token {token}")).map_err(|_| ApiError::InvalidToken)?;
        value.set_sensitive(true);
        Ok(Self { value })
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

/// Result of the two-step authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Token(AuthToken),
    Anonymous,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Token(_))
    }
}

/// `<prefix>_<8 hex chars>`.
pub fn random_username(prefix: &str) -> String {
    format!("{prefix}_{}", short_hex(8))
}

/// The first `len` hex characters of a fresh v4 UUID.
pub(crate) fn short_hex(len: usize) -> String {
    let mut hex = uuid::Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}

/// Register, or log in with the same credentials when registration yields no token.
pub async fn resolve(client: &ApiClient, username: &str, password: &str) -> AuthOutcome {
    let credentials = Credentials::register(username, password);

    if let Some(token) = token_from("register", requests::register(client, &credentials).await) {
        debug!("Registered {username}");
        return AuthOutcome::Token(token);
    }

    let credentials = credentials.login();
    if let Some(token) = token_from("login", requests::login(client, &credentials).await) {
        debug!("Logged in as {username}");
        return AuthOutcome::Token(token);
    }

    warn!("No token obtained for user {username}");
    AuthOutcome::Anonymous
}

fn token_from(step: &str, response: Result<String, ApiError>) -> Option<AuthToken> {
    let body = match response {
        Ok(body) => body,
        Err(err) => {
            debug!("{step} failed: {err}");
            return None;
        }
    };

    let token = match serde_json::from_str::<TokenResponse>(&body) {
        Ok(TokenResponse { token: Some(token) }) if !token.is_empty() => token,
        Ok(_) => {
            warn!("No token in {step} response");
            return None;
        }
        Err(err) => {
            warn!("Failed to parse {step} response: {err}");
            return None;
        }
    };

    match AuthToken::new(&token) {
        Ok(token) => Some(token),
        Err(err) => {
            warn!("Unusable {step} token: {err}");
            None
        }
    }
}
