use crate::auth::AuthOutcome;
use crate::config::LoadConfig;
use crate::error::ApiError;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;

/// Per-session HTTP client for the OPTIKORM API.
///
/// Owns its own connection pool and, once a token was obtained, attaches the `Authorization`
/// header to every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
    authorization: Option<HeaderValue>,
}

impl ApiClient {
    pub fn new(config: &LoadConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &LoadConfig) -> Self {
        Self {
            http,
            base: config.api_base(),
            authorization: None,
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base, endpoint)
    }

    /// Attach the resolved token, or drop any header for an anonymous session.
    pub fn authorize(&mut self, outcome: &AuthOutcome) {
        self.authorization = match outcome {
            AuthOutcome::Token(token) => Some(token.header_value().clone()),
            AuthOutcome::Anonymous => None,
        };
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization.is_some()
    }

    pub async fn get(&self, endpoint: &'static str) -> Result<Response, ApiError> {
        Ok(self.request(self.http.get(self.url(endpoint))).send().await?)
    }

    pub async fn post<B>(&self, endpoint: &'static str, body: &B) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        Ok(self
            .request(self.http.post(self.url(endpoint)))
            .json(body)
            .send()
            .await?)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.authorization {
            Some(value) => builder.header(AUTHORIZATION, value.clone()),
            None => builder,
        }
    }
}

/// Read the whole body of a response whose status is one of `accepted`.
///
/// The body is read either way so the connection can be reused.
pub async fn expect_status(
    endpoint: &'static str,
    response: Response,
    accepted: &[StatusCode],
) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if accepted.contains(&status) {
        Ok(body)
    } else {
        Err(ApiError::Status { endpoint, status })
    }
}

/// Same as [`expect_status`] for any 2xx status.
pub async fn expect_success(endpoint: &'static str, response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Status { endpoint, status })
    }
}
