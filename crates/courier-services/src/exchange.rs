//! Authorization-code exchange, run on the callback page

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_core::constants::{AUTHORIZATION_CODE_GRANT, ID_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use courier_core::models::{AuthorizationCode, Navigation, TokenResponse};
use courier_core::{AppError, HostedUi};

use crate::cookies::{Cookie, CookieStore};

/// Form body of the token request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub code: AuthorizationCode,
    pub client_id: String,
    pub redirect_uri: String,
}

impl TokenRequest {
    /// Exactly the four fields of the authorization-code grant, in wire order.
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("grant_type", AUTHORIZATION_CODE_GRANT.to_string()),
            ("code", self.code.as_str().to_string()),
            ("client_id", self.client_id.clone()),
            ("redirect_uri", self.redirect_uri.clone()),
        ]
    }
}

#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange(&self, request: &TokenRequest) -> Result<TokenResponse, AppError>;
}

/// Token endpoint reached over HTTPS with a form-encoded POST
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpTokenEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange(&self, request: &TokenRequest) -> Result<TokenResponse, AppError> {
        let response = self
            .client
            .post(&self.url)
            .form(&request.form_fields())
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AppError::Http(format!("Failed to parse token response: {}", e)))
    }
}

#[derive(Debug)]
pub enum ExchangeOutcome {
    /// Tokens stored; continue to the upload page
    Complete(Navigation),
    /// No usable code in the callback; start the login again
    Redirect(Navigation),
    /// The token endpoint refused or could not be reached. The callback page stays as is.
    Failed(AppError),
}

pub struct CodeExchange {
    hosted_ui: HostedUi,
    endpoint: Arc<dyn TokenEndpoint>,
    upload_url: String,
}

impl CodeExchange {
    pub fn new(hosted_ui: HostedUi, endpoint: Arc<dyn TokenEndpoint>, upload_url: impl Into<String>) -> Self {
        Self {
            hosted_ui,
            endpoint,
            upload_url: upload_url.into(),
        }
    }

    pub fn token_request(&self, code: AuthorizationCode) -> TokenRequest {
        TokenRequest {
            code,
            client_id: self.hosted_ui.client_id.clone(),
            redirect_uri: self.hosted_ui.callback_url.clone(),
        }
    }

    /// Exchange the `code` from `raw_query` and store the resulting tokens in `cookies`.
    pub async fn run(&self, raw_query: &str, cookies: &dyn CookieStore) -> ExchangeOutcome {
        let Some(code) = AuthorizationCode::from_query(raw_query) else {
            tracing::warn!("Not authenticated");
            return ExchangeOutcome::Redirect(Navigation::to(self.hosted_ui.login_url()));
        };

        let request = self.token_request(code);
        let start = std::time::Instant::now();

        let tokens = match self.endpoint.exchange(&request).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Authorization code exchange failed"
                );
                return ExchangeOutcome::Failed(e);
            }
        };

        cookies.set(Cookie::new(ID_TOKEN_COOKIE, tokens.id_token).with_max_age(tokens.expires_in));
        if let Some(refresh_token) = tokens.refresh_token {
            cookies.set(Cookie::new(REFRESH_TOKEN_COOKIE, refresh_token).with_max_age(tokens.expires_in));
        }

        tracing::info!(
            token_type = %tokens.token_type,
            expires_in = tokens.expires_in,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Authorization code exchanged"
        );

        ExchangeOutcome::Complete(Navigation::to(self.upload_url.clone()))
    }
}
