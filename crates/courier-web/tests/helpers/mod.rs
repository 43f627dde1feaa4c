#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use courier_core::models::{
    encode_payload_segment, IdentityToken, TemporaryCredentials, TokenClaims, TokenResponse,
};
use courier_core::{AppError, ClientConfig};
use courier_services::{CredentialProvider, FixedClock, TokenEndpoint, TokenRequest};
use courier_storage::LocalStorage;
use courier_web::setup::routes::setup_routes;
use courier_web::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const SITE_URL: &str = "http://localhost:3000";
pub const BUCKET: &str = "courier-test-bucket";
/// Fixed "now" of every test server: 2023-11-14T22:13:20Z
pub const NOW_SECS: i64 = 1_700_000_000;

/// Token endpoint that answers every exchange the same way
pub struct StubTokenEndpoint {
    pub response: Result<TokenResponse, (u16, String)>,
    pub requests: Mutex<Vec<TokenRequest>>,
}

#[async_trait]
impl TokenEndpoint for StubTokenEndpoint {
    async fn exchange(&self, request: &TokenRequest) -> Result<TokenResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        self.response
            .clone()
            .map_err(|(status, body)| AppError::TokenEndpoint { status, body })
    }
}

/// Identity pool stand-in; counts how often credentials were requested
pub struct StubCredentials {
    pub fail_with: Option<String>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl CredentialProvider for StubCredentials {
    async fn credentials_for(
        &self,
        _login_key: &str,
        _token: &IdentityToken,
    ) -> Result<TemporaryCredentials, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(AppError::Federation(message.clone())),
            None => Ok(TemporaryCredentials::new("ASIATEST", "secret", "session")),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub token_endpoint: Arc<StubTokenEndpoint>,
    pub credentials: Arc<StubCredentials>,
    pub storage_dir: TempDir,
    pub config: ClientConfig,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Path where the local backend writes `key`
    pub fn stored_object(&self, key: &str) -> std::path::PathBuf {
        self.storage_dir.path().join(BUCKET).join(key)
    }
}

pub struct TestAppOptions {
    pub token_response: Result<TokenResponse, (u16, String)>,
    pub federation_error: Option<String>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            token_response: Ok(token_response(&valid_id_token())),
            federation_error: None,
        }
    }
}

pub fn test_config(storage_path: &str) -> ClientConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("SITE_URL", SITE_URL.to_string()),
        ("AWS_REGION", "ap-northeast-1".to_string()),
        ("COGNITO_DOMAIN_NAME", "courier-test".to_string()),
        ("COGNITO_USER_POOL_ID", "ap-northeast-1_AbCdEf".to_string()),
        ("COGNITO_CLIENT_ID", "client123".to_string()),
        ("IDENTITY_POOL_ID", "ap-northeast-1:pool".to_string()),
        ("STORAGE_BACKEND", "local".to_string()),
        ("S3_BUCKET", BUCKET.to_string()),
        ("LOCAL_STORAGE_PATH", storage_path.to_string()),
        ("MAX_UPLOAD_SIZE_MB", "1".to_string()),
    ]);

    ClientConfig::from_lookup(move |name: &str| vars.get(name).cloned())
        .expect("Failed to build test config")
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let storage_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&storage_dir.path().to_string_lossy());
    config.validate().expect("Test config must be valid");

    let storage = LocalStorage::new(storage_dir.path())
        .await
        .expect("Failed to create local storage");

    let token_endpoint = Arc::new(StubTokenEndpoint {
        response: options.token_response,
        requests: Mutex::new(Vec::new()),
    });
    let credentials = Arc::new(StubCredentials {
        fail_with: options.federation_error,
        calls: AtomicUsize::new(0),
    });

    let state = Arc::new(AppState::new(
        config.clone(),
        token_endpoint.clone(),
        credentials.clone(),
        Arc::new(storage),
        Arc::new(FixedClock::at_secs(NOW_SECS)),
    ));

    let app = setup_routes(&config, state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        token_endpoint,
        credentials,
        storage_dir,
        config,
    }
}

pub fn id_token_expiring_at(exp: i64) -> String {
    let claims = TokenClaims::new(exp)
        .with_claim("sub", "5f1c-aa")
        .with_claim("email", "user@example.com");
    let payload = encode_payload_segment(&claims).expect("Failed to encode claims");
    format!("eyJhbGciOiJSUzI1NiJ9.{}.c2lnbmF0dXJl", payload)
}

pub fn valid_id_token() -> String {
    id_token_expiring_at(NOW_SECS + 3600)
}

pub fn expired_id_token() -> String {
    id_token_expiring_at(NOW_SECS - 60)
}

pub fn token_response(id_token: &str) -> TokenResponse {
    TokenResponse {
        id_token: id_token.to_string(),
        refresh_token: Some("refresh-abc".to_string()),
        access_token: Some("access-abc".to_string()),
        expires_in: 3600,
        token_type: "Bearer".to_string(),
    }
}

pub fn id_token_cookie(token: &str) -> String {
    format!("id_token={}", token)
}
