//! Configuration module
//!
//! `ClientConfig` carries the values produced by provisioning (region, pool ids,
//! client id, login domain, bucket) plus the client's own site URL and paths.

use std::env;

use crate::constants::{DEFAULT_CALLBACK_PATH, DEFAULT_SITE_URL, DEFAULT_UPLOAD_PATH};
use crate::hosted_ui::HostedUi;
use crate::stack::StackOutputs;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 3000;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const HTTP_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub server_port: u16,
    pub site_url: String,
    pub callback_path: String,
    pub upload_path: String,
    pub environment: String,
    // Identity provider
    pub region: String,
    pub cognito_domain_name: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub identity_pool_id: String,
    /// Replaces the hosted login host, e.g. for a local stub
    pub cognito_base_url: Option<String>,
    // Storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub max_upload_size_bytes: usize,
    pub http_timeout_secs: u64,
    pub http_concurrency_limit: usize,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Values from the stack outputs file
    /// (`COURIER_STACK_OUTPUTS`) fill in whatever the variables leave unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let outputs = match var("COURIER_STACK_OUTPUTS") {
            Some(path) => StackOutputs::from_file(&path)
                .map_err(|e| anyhow::anyhow!("COURIER_STACK_OUTPUTS: {}", e))?,
            None => StackOutputs::default(),
        };

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let max_upload_size_mb = var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(ClientConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_PORT),
            site_url: var("SITE_URL")
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            callback_path: var("CALLBACK_PATH")
                .unwrap_or_else(|| DEFAULT_CALLBACK_PATH.to_string()),
            upload_path: var("UPLOAD_PATH").unwrap_or_else(|| DEFAULT_UPLOAD_PATH.to_string()),
            environment,
            region: var("AWS_REGION")
                .or_else(|| var("AWS_DEFAULT_REGION"))
                .unwrap_or_default(),
            cognito_domain_name: var("COGNITO_DOMAIN_NAME")
                .or(outputs.domain_name)
                .unwrap_or_default(),
            user_pool_id: var("COGNITO_USER_POOL_ID")
                .or(outputs.user_pool_id)
                .unwrap_or_default(),
            client_id: var("COGNITO_CLIENT_ID")
                .or(outputs.user_pool_client_id)
                .unwrap_or_default(),
            identity_pool_id: var("IDENTITY_POOL_ID")
                .or(outputs.identity_pool_id)
                .unwrap_or_default(),
            cognito_base_url: var("COGNITO_BASE_URL"),
            storage_backend,
            s3_bucket: var("S3_BUCKET").or(outputs.bucket_name),
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            http_timeout_secs: var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            http_concurrency_limit: var("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let required = [
            ("AWS_REGION", &self.region),
            ("COGNITO_DOMAIN_NAME", &self.cognito_domain_name),
            ("COGNITO_USER_POOL_ID", &self.user_pool_id),
            ("COGNITO_CLIENT_ID", &self.client_id),
            ("IDENTITY_POOL_ID", &self.identity_pool_id),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(anyhow::anyhow!(
                    "{} must be set (or provided through COURIER_STACK_OUTPUTS)",
                    name
                ));
            }
        }

        if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            return Err(anyhow::anyhow!("SITE_URL must be an http(s) URL"));
        }

        for (name, path) in [
            ("CALLBACK_PATH", &self.callback_path),
            ("UPLOAD_PATH", &self.upload_path),
        ] {
            if !path.starts_with('/') {
                return Err(anyhow::anyhow!("{} must start with '/'", name));
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Cookies get `Secure` only when the site itself is served over https.
    pub fn secure_cookies(&self) -> bool {
        self.site_url.starts_with("https://")
    }

    pub fn callback_url(&self) -> String {
        format!("{}{}", self.site_url, self.callback_path)
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.site_url, self.upload_path)
    }

    pub fn bucket(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or_default()
    }

    pub fn hosted_ui(&self) -> HostedUi {
        let ui = HostedUi::new(
            &self.cognito_domain_name,
            &self.region,
            &self.client_id,
            &self.user_pool_id,
            self.callback_url(),
        );
        match &self.cognito_base_url {
            Some(base) => ui.with_base_url(base),
            None => ui,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("AWS_REGION", "ap-northeast-1"),
            ("COGNITO_DOMAIN_NAME", "courier-demo"),
            ("COGNITO_USER_POOL_ID", "ap-northeast-1_Pool"),
            ("COGNITO_CLIENT_ID", "client123"),
            ("IDENTITY_POOL_ID", "ap-northeast-1:identity"),
            ("S3_BUCKET", "courier-bucket"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&complete())).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.site_url, "http://localhost:3000");
        assert_eq!(config.callback_url(), "http://localhost:3000/auth");
        assert_eq!(config.upload_url(), "http://localhost:3000/upload");
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert_eq!(config.max_upload_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.http_timeout_secs, 30);
        assert!(!config.is_production());
        assert!(!config.secure_cookies());
        config.validate().unwrap();
    }

    #[test]
    fn test_hosted_ui_from_config() {
        let config = ClientConfig::from_lookup(lookup(&complete())).unwrap();
        let ui = config.hosted_ui();
        assert_eq!(
            ui.token_endpoint(),
            "https://courier-demo.auth.ap-northeast-1.amazoncognito.com/oauth2/token"
        );
        assert_eq!(ui.callback_url, "http://localhost:3000/auth");
    }

    #[test]
    fn test_validate_requires_identity_values() {
        let mut vars = complete();
        vars.retain(|(k, _)| *k != "IDENTITY_POOL_ID");
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("IDENTITY_POOL_ID"));
    }

    #[test]
    fn test_validate_storage_backend() {
        let mut vars = complete();
        vars.retain(|(k, _)| *k != "S3_BUCKET");
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.validate().is_err());

        vars.push(("STORAGE_BACKEND", "local"));
        vars.push(("LOCAL_STORAGE_PATH", "/tmp/courier"));
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_https_site_marks_cookies_secure() {
        let mut vars = complete();
        vars.push(("SITE_URL", "https://app.example.com/"));
        vars.push(("ENVIRONMENT", "production"));
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.site_url, "https://app.example.com");
        assert!(config.secure_cookies());
        assert!(config.is_production());
    }

    #[test]
    fn test_stack_outputs_fill_unset_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs.json");
        std::fs::write(
            &path,
            r#"{"CognitoUserTracking": {
                "cognitooutputUserPoolIdAAAA": "pool-from-stack",
                "cognitooutputidentitypoolidBBBB": "identity-from-stack",
                "cognitooutputuserpoolclientidCCCC": "client-from-stack",
                "cognitooutputdomainnameDDDD": "domain-from-stack",
                "bucketoutputs3bucketEEEE": "bucket-from-stack"
            }}"#,
        )
        .unwrap();
        let path = path.to_string_lossy().to_string();

        let vars = vec![
            ("AWS_REGION", "us-east-1"),
            ("COGNITO_CLIENT_ID", "client-from-env"),
            ("COURIER_STACK_OUTPUTS", path.as_str()),
        ];
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.user_pool_id, "pool-from-stack");
        assert_eq!(config.identity_pool_id, "identity-from-stack");
        assert_eq!(config.client_id, "client-from-env");
        assert_eq!(config.cognito_domain_name, "domain-from-stack");
        assert_eq!(config.bucket(), "bucket-from-stack");
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_storage_backend_is_rejected() {
        let mut vars = complete();
        vars.push(("STORAGE_BACKEND", "nfs"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());
    }
}
