//! Federated upload: identity token, then temporary credentials, then one object put

use std::sync::Arc;

use bytes::Bytes;
use courier_core::constants::ID_TOKEN_COOKIE;
use courier_core::models::{IdentityToken, UploadStatus, UploadTarget};
use courier_core::{AppError, UploadError};
use courier_storage::{PutObjectOutput, Storage};

use crate::clock::Clock;
use crate::cookies::CookieStore;
use crate::federation::CredentialProvider;

/// A file picked in the upload form
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

pub struct FederatedUpload {
    login_key: String,
    bucket: String,
    credentials: Arc<dyn CredentialProvider>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl FederatedUpload {
    /// `login_key` is the provider key the identity token is presented under,
    /// `cognito-idp.{region}.amazonaws.com/{user_pool_id}`.
    pub fn new(
        login_key: impl Into<String>,
        bucket: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            login_key: login_key.into(),
            bucket: bucket.into(),
            credentials,
            storage,
            clock,
        }
    }

    /// Run one submission and render its status line.
    pub async fn submit(
        &self,
        prefix: &str,
        file: Option<UploadFile>,
        cookies: &dyn CookieStore,
    ) -> UploadStatus {
        match self.try_submit(prefix, file, cookies).await {
            Ok(_) => UploadStatus::success(),
            Err(e) => {
                tracing::warn!(prefix = %prefix, error = %e, "Upload failed");
                UploadStatus::failure(&e)
            }
        }
    }

    pub async fn try_submit(
        &self,
        prefix: &str,
        file: Option<UploadFile>,
        cookies: &dyn CookieStore,
    ) -> Result<PutObjectOutput, UploadError> {
        let token = IdentityToken::new(cookies.get(ID_TOKEN_COOKIE).unwrap_or_default());
        self.ensure_usable(&token)?;

        let file = file
            .filter(|f| !f.filename.is_empty())
            .ok_or(UploadError::MissingFile)?;

        let credentials = self
            .credentials
            .credentials_for(&self.login_key, &token)
            .await?;

        let target = UploadTarget::new(&self.bucket, prefix, &file.filename);
        let output = self
            .storage
            .put_object(
                &credentials,
                &target,
                file.data,
                file.content_type.as_deref(),
            )
            .await?;

        Ok(output)
    }

    /// No credential request is made unless the token is present, readable and unexpired.
    fn ensure_usable(&self, token: &IdentityToken) -> Result<(), UploadError> {
        if token.is_empty() {
            return Err(UploadError::MissingToken);
        }
        let claims = token.claims().map_err(|e: AppError| {
            tracing::debug!(error = %e, "Identity token unreadable");
            UploadError::MissingToken
        })?;
        if claims.is_expired_at(self.clock.now()) {
            return Err(UploadError::ExpiredToken);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::cookies::{Cookie, MemoryCookieStore};
    use async_trait::async_trait;
    use courier_core::models::{encode_payload_segment, TemporaryCredentials, TokenClaims};
    use courier_storage::{StorageBackend, StorageError, StorageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const NOW_SECS: i64 = 1_700_000_000;
    const LOGIN_KEY: &str = "cognito-idp.us-east-1.amazonaws.com/us-east-1_Pool";

    #[derive(Default)]
    struct StubCredentials {
        calls: AtomicUsize,
        logins: Mutex<Vec<(String, String)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl CredentialProvider for StubCredentials {
        async fn credentials_for(
            &self,
            login_key: &str,
            token: &IdentityToken,
        ) -> Result<TemporaryCredentials, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.logins
                .lock()
                .unwrap()
                .push((login_key.to_string(), token.as_str().to_string()));
            match &self.fail_with {
                Some(msg) => Err(AppError::Federation(msg.clone())),
                None => Ok(TemporaryCredentials::new("ASIA", "secret", "session")),
            }
        }
    }

    #[derive(Default)]
    struct StubStorage {
        puts: Mutex<Vec<(String, String, Bytes)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl Storage for StubStorage {
        async fn put_object(
            &self,
            credentials: &TemporaryCredentials,
            target: &UploadTarget,
            data: Bytes,
            _content_type: Option<&str>,
        ) -> StorageResult<PutObjectOutput> {
            if let Some(msg) = &self.fail_with {
                return Err(StorageError::UploadFailed(msg.clone()));
            }
            assert_eq!(credentials.session_token, "session");
            let size_bytes = data.len() as u64;
            self.puts
                .lock()
                .unwrap()
                .push((target.bucket.clone(), target.key(), data));
            Ok(PutObjectOutput {
                key: target.key(),
                e_tag: Some("\"etag\"".to_string()),
                size_bytes,
            })
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }
    }

    fn flow(credentials: Arc<StubCredentials>, storage: Arc<StubStorage>) -> FederatedUpload {
        FederatedUpload::new(
            LOGIN_KEY,
            "courier-bucket",
            credentials,
            storage,
            Arc::new(FixedClock::at_secs(NOW_SECS)),
        )
    }

    fn token(exp: i64) -> String {
        format!(
            "h.{}.s",
            encode_payload_segment(&TokenClaims::new(exp)).unwrap()
        )
    }

    fn cookies_with(token: &str) -> MemoryCookieStore {
        let store = MemoryCookieStore::new();
        store.set(Cookie::new(ID_TOKEN_COOKIE, token));
        store
    }

    fn file() -> Option<UploadFile> {
        Some(UploadFile::new("report.pdf", Bytes::from_static(b"%PDF")))
    }

    #[tokio::test]
    async fn test_success_puts_prefix_slash_filename() {
        let credentials = Arc::new(StubCredentials::default());
        let storage = Arc::new(StubStorage::default());
        let token = token(NOW_SECS + 60);

        let status = flow(credentials.clone(), storage.clone())
            .submit("docs", file(), &cookies_with(&token))
            .await;

        assert_eq!(status, UploadStatus::success());
        let puts = storage.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "courier-bucket");
        assert_eq!(puts[0].1, "docs/report.pdf");
        assert_eq!(puts[0].2, Bytes::from_static(b"%PDF"));

        let logins = credentials.logins.lock().unwrap();
        assert_eq!(logins[0], (LOGIN_KEY.to_string(), token));
    }

    #[tokio::test]
    async fn test_absent_token_never_requests_credentials() {
        let credentials = Arc::new(StubCredentials::default());
        let storage = Arc::new(StubStorage::default());

        let status = flow(credentials.clone(), storage.clone())
            .submit("docs", file(), &MemoryCookieStore::new())
            .await;

        assert_eq!(status.class_name, "failure");
        assert_eq!(status.message, "Error!! (No identity token)");
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
        assert!(storage.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_token_never_requests_credentials() {
        let credentials = Arc::new(StubCredentials::default());
        let storage = Arc::new(StubStorage::default());

        let result = flow(credentials.clone(), storage)
            .try_submit("docs", file(), &cookies_with(&token(NOW_SECS - 1)))
            .await;

        assert_eq!(result.unwrap_err(), UploadError::ExpiredToken);
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_federation() {
        let credentials = Arc::new(StubCredentials::default());
        let result = flow(credentials.clone(), Arc::new(StubStorage::default()))
            .try_submit("docs", None, &cookies_with(&token(NOW_SECS + 60)))
            .await;

        assert_eq!(result.unwrap_err(), UploadError::MissingFile);
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_federation_failure_is_reported_in_status() {
        let credentials = Arc::new(StubCredentials {
            fail_with: Some("Invalid login token. Token expired".to_string()),
            ..Default::default()
        });
        let status = flow(credentials, Arc::new(StubStorage::default()))
            .submit("docs", file(), &cookies_with(&token(NOW_SECS + 60)))
            .await;

        assert_eq!(
            status.message,
            "Error!! (Invalid login token. Token expired)"
        );
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_in_status() {
        let storage = Arc::new(StubStorage {
            fail_with: Some("Access Denied".to_string()),
            ..Default::default()
        });
        let status = flow(Arc::new(StubCredentials::default()), storage)
            .submit("docs", file(), &cookies_with(&token(NOW_SECS + 60)))
            .await;

        assert_eq!(status.class_name, "failure");
        assert_eq!(status.message, "Error!! (Access Denied)");
    }
}
