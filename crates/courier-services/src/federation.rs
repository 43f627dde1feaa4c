//! Credential federation: identity token in, temporary storage credentials out

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentity::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentity::Client as CognitoIdentityClient;
use courier_core::models::{IdentityToken, TemporaryCredentials};
use courier_core::AppError;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Present `token` under `login_key` and return credentials for the mapped role.
    async fn credentials_for(
        &self,
        login_key: &str,
        token: &IdentityToken,
    ) -> Result<TemporaryCredentials, AppError>;
}

/// Identity pool backed provider (`GetId` then `GetCredentialsForIdentity`)
#[derive(Clone, Debug)]
pub struct CognitoCredentialProvider {
    client: CognitoIdentityClient,
    identity_pool_id: String,
}

impl CognitoCredentialProvider {
    /// The identity pool APIs used here are unsigned, so no local AWS credentials are loaded.
    pub async fn new(region: &str, identity_pool_id: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .no_credentials()
            .load()
            .await;

        Self::from_client(CognitoIdentityClient::new(&config), identity_pool_id)
    }

    pub fn from_client(client: CognitoIdentityClient, identity_pool_id: impl Into<String>) -> Self {
        Self {
            client,
            identity_pool_id: identity_pool_id.into(),
        }
    }
}

/// Service message when the pool answered, full error chain otherwise
fn sdk_error_message<E, R>(err: SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => service
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| service.to_string()),
        None => DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl CredentialProvider for CognitoCredentialProvider {
    async fn credentials_for(
        &self,
        login_key: &str,
        token: &IdentityToken,
    ) -> Result<TemporaryCredentials, AppError> {
        let start = std::time::Instant::now();

        let identity = self
            .client
            .get_id()
            .identity_pool_id(&self.identity_pool_id)
            .logins(login_key, token.as_str())
            .send()
            .await
            .map_err(|e| AppError::Federation(sdk_error_message(e)))?;

        let identity_id = identity
            .identity_id()
            .ok_or_else(|| AppError::Federation("Identity pool returned no identity id".to_string()))?
            .to_string();

        let output = self
            .client
            .get_credentials_for_identity()
            .identity_id(&identity_id)
            .logins(login_key, token.as_str())
            .send()
            .await
            .map_err(|e| AppError::Federation(sdk_error_message(e)))?;

        let credentials = output
            .credentials()
            .ok_or_else(|| AppError::Federation("Identity pool returned no credentials".to_string()))?;

        let field = |value: Option<&str>, name: &str| {
            value
                .map(str::to_string)
                .ok_or_else(|| AppError::Federation(format!("Credentials missing {}", name)))
        };

        let mut temporary = TemporaryCredentials::new(
            field(credentials.access_key_id(), "access key id")?,
            field(credentials.secret_key(), "secret key")?,
            field(credentials.session_token(), "session token")?,
        )
        .with_identity_id(identity_id.clone());

        if let Some(expiration) = credentials.expiration() {
            if let Some(at) = chrono::DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos()) {
                temporary = temporary.with_expiration(at);
            }
        }

        tracing::info!(
            identity_id = %identity_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Temporary credentials issued"
        );

        Ok(temporary)
    }
}
