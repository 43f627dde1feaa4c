//! Provisioning context and deployed outputs
//!
//! The infrastructure app reads its parameters from the `cognito-user-tracking`
//! context key and publishes pool ids, client id, domain and bucket as stack
//! outputs. This module reads both sides so the client can be configured from a
//! deployment without copying values by hand.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{DEFAULT_CALLBACK_PATH, OAUTH_SCOPES};
use crate::error::AppError;

/// Context key holding the provisioning parameters.
pub const CONTEXT_KEY: &str = "cognito-user-tracking";

/// Parameters supplied to the provisioning tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackContext {
    pub project_name: String,
    pub cognito_domain_name: String,
    pub client_app_url: String,
}

/// Bucket CORS rule allowing the client origin to write directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorsRule {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub expose_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNames {
    pub user_pool: String,
    pub user_pool_client: String,
    pub identity_pool: String,
    pub authenticated_role: String,
    pub unauthenticated_role: String,
}

fn missing_context() -> AppError {
    AppError::Configuration(format!(
        "You need to configure context parameters. \"{}\".(\"projectName\", \"cognitoDomainName\", \"clientAppUrl\")",
        CONTEXT_KEY
    ))
}

impl StackContext {
    /// Parse a CDK context document. Accepts either a full `cdk.json` (key under
    /// `context`) or a bare context object.
    pub fn from_json(document: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(document)?;
        let context = value
            .get("context")
            .and_then(|c| c.get(CONTEXT_KEY))
            .or_else(|| value.get(CONTEXT_KEY))
            .ok_or_else(missing_context)?;

        serde_json::from_value(context.clone()).map_err(|_| missing_context())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let document = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&document)
    }

    fn app_url(&self) -> &str {
        self.client_app_url.trim_end_matches('/')
    }

    /// Callback registered on the app client, `{clientAppUrl}/auth`.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.app_url(), DEFAULT_CALLBACK_PATH)
    }

    /// Sign-out URL registered on the app client; same as the callback.
    pub fn logout_url(&self) -> String {
        self.callback_url()
    }

    pub fn oauth_scopes(&self) -> Vec<&'static str> {
        OAUTH_SCOPES.to_vec()
    }

    pub fn cors_rule(&self) -> CorsRule {
        CorsRule {
            allowed_origins: vec![self.client_app_url.clone()],
            allowed_methods: ["HEAD", "GET", "POST", "PUT", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["*".to_string()],
            expose_headers: vec!["ETag".to_string()],
        }
    }

    pub fn resource_names(&self) -> ResourceNames {
        ResourceNames {
            user_pool: format!("{}-user-pool", self.project_name),
            user_pool_client: self.project_name.clone(),
            identity_pool: format!("{}-id-pool", self.project_name),
            authenticated_role: format!("{}-idp-auth-role", self.project_name),
            unauthenticated_role: format!("{}-idp-unauth-role", self.project_name),
        }
    }

    /// Trust condition letting authenticated identities of the pool assume a role.
    pub fn authenticated_trust_condition(&self, identity_pool_id: &str) -> Value {
        trust_condition(identity_pool_id, "authenticated")
    }

    pub fn unauthenticated_trust_condition(&self, identity_pool_id: &str) -> Value {
        trust_condition(identity_pool_id, "unauthenticated")
    }

    /// Inline policy of the authenticated role.
    pub fn authenticated_role_policy(&self) -> Value {
        json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Action": ["cognito-identity:*", "s3:PutObject"],
                "Resource": ["*"]
            }]
        })
    }
}

fn trust_condition(identity_pool_id: &str, amr: &str) -> Value {
    json!({
        "StringEquals": {
            "cognito-identity.amazonaws.com:aud": identity_pool_id
        },
        "ForAnyValue:StringLike": {
            "cognito-identity.amazonaws.com:amr": amr
        }
    })
}

/// Values published by a deployed stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackOutputs {
    pub user_pool_id: Option<String>,
    pub identity_pool_id: Option<String>,
    pub user_pool_client_id: Option<String>,
    pub domain_name: Option<String>,
    pub bucket_name: Option<String>,
}

impl StackOutputs {
    /// Parse a `cdk deploy --outputs-file` document (`{stack: {logicalId: value}}`).
    ///
    /// Output logical ids carry a construct-path prefix and a hash suffix, so they
    /// are matched by fragment.
    pub fn from_json(document: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(document)?;
        let stacks = value.as_object().ok_or_else(|| {
            AppError::Configuration("Stack outputs file must be a JSON object".to_string())
        })?;

        let mut outputs = StackOutputs::default();
        for entries in stacks.values().filter_map(Value::as_object) {
            for (logical_id, value) in entries {
                let Some(value) = value.as_str() else {
                    continue;
                };
                let id = logical_id.to_lowercase();
                let slot = if id.contains("outputuserpoolclientid") {
                    &mut outputs.user_pool_client_id
                } else if id.contains("outputuserpoolid") {
                    &mut outputs.user_pool_id
                } else if id.contains("outputidentitypoolid") {
                    &mut outputs.identity_pool_id
                } else if id.contains("outputdomainname") {
                    &mut outputs.domain_name
                } else if id.contains("outputs3bucket") {
                    &mut outputs.bucket_name
                } else {
                    continue;
                };
                *slot = Some(value.to_string());
            }
        }

        Ok(outputs)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read stack outputs {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDK_JSON: &str = r#"{
        "app": "npx ts-node bin/cognito-user-tracking.ts",
        "context": {
            "cognito-user-tracking": {
                "projectName": "courier",
                "cognitoDomainName": "courier-demo",
                "clientAppUrl": "http://localhost:3000"
            }
        }
    }"#;

    #[test]
    fn test_context_from_cdk_json() {
        let ctx = StackContext::from_json(CDK_JSON).unwrap();
        assert_eq!(ctx.project_name, "courier");
        assert_eq!(ctx.cognito_domain_name, "courier-demo");
        assert_eq!(ctx.callback_url(), "http://localhost:3000/auth");
        assert_eq!(ctx.logout_url(), ctx.callback_url());
        assert_eq!(ctx.oauth_scopes(), vec!["email", "openid", "profile"]);
    }

    #[test]
    fn test_context_accepts_bare_object() {
        let doc = r#"{"cognito-user-tracking": {"projectName": "p", "cognitoDomainName": "d", "clientAppUrl": "https://app.example.com/"}}"#;
        let ctx = StackContext::from_json(doc).unwrap();
        assert_eq!(ctx.callback_url(), "https://app.example.com/auth");
    }

    #[test]
    fn test_context_missing_names_required_fields() {
        let err = StackContext::from_json(r#"{"context": {}}"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cognito-user-tracking"));
        assert!(msg.contains("projectName"));
        assert!(msg.contains("cognitoDomainName"));
        assert!(msg.contains("clientAppUrl"));

        let partial = r#"{"cognito-user-tracking": {"projectName": "p"}}"#;
        assert!(matches!(
            StackContext::from_json(partial),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_derived_resources() {
        let ctx = StackContext::from_json(CDK_JSON).unwrap();
        let names = ctx.resource_names();
        assert_eq!(names.user_pool, "courier-user-pool");
        assert_eq!(names.identity_pool, "courier-id-pool");
        assert_eq!(names.authenticated_role, "courier-idp-auth-role");
        assert_eq!(names.unauthenticated_role, "courier-idp-unauth-role");

        let cors = ctx.cors_rule();
        assert_eq!(cors.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(
            cors.allowed_methods,
            vec!["HEAD", "GET", "POST", "PUT", "DELETE"]
        );
        assert_eq!(cors.allowed_headers, vec!["*"]);
        assert_eq!(cors.expose_headers, vec!["ETag"]);
    }

    #[test]
    fn test_trust_conditions() {
        let ctx = StackContext::from_json(CDK_JSON).unwrap();
        let cond = ctx.authenticated_trust_condition("us-east-1:pool");
        assert_eq!(
            cond["StringEquals"]["cognito-identity.amazonaws.com:aud"],
            "us-east-1:pool"
        );
        assert_eq!(
            cond["ForAnyValue:StringLike"]["cognito-identity.amazonaws.com:amr"],
            "authenticated"
        );
        let unauth = ctx.unauthenticated_trust_condition("us-east-1:pool");
        assert_eq!(
            unauth["ForAnyValue:StringLike"]["cognito-identity.amazonaws.com:amr"],
            "unauthenticated"
        );
    }

    #[test]
    fn test_outputs_matched_by_fragment() {
        let doc = r#"{
            "CognitoUserTracking": {
                "cognitooutputUserPoolId5A8C2F1B": "us-east-1_Pool",
                "cognitooutputidentitypoolid0D1E2F3A": "us-east-1:identity",
                "cognitooutputuserpoolclientid77AA11BB": "client-abc",
                "cognitooutputdomainname9C8B7A6D": "courier-demo",
                "bucketoutputs3bucket12345678": "courier-bucket-xyz",
                "SomethingElse": "ignored"
            }
        }"#;
        let outputs = StackOutputs::from_json(doc).unwrap();
        assert_eq!(outputs.user_pool_id.as_deref(), Some("us-east-1_Pool"));
        assert_eq!(
            outputs.identity_pool_id.as_deref(),
            Some("us-east-1:identity")
        );
        assert_eq!(outputs.user_pool_client_id.as_deref(), Some("client-abc"));
        assert_eq!(outputs.domain_name.as_deref(), Some("courier-demo"));
        assert_eq!(outputs.bucket_name.as_deref(), Some("courier-bucket-xyz"));
    }

    #[test]
    fn test_outputs_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs.json");
        std::fs::write(
            &path,
            r#"{"Stack": {"bucketoutputs3bucketABCD": "b"}}"#,
        )
        .unwrap();
        let outputs = StackOutputs::from_file(&path).unwrap();
        assert_eq!(outputs.bucket_name.as_deref(), Some("b"));
        assert!(outputs.user_pool_id.is_none());

        assert!(StackOutputs::from_file(dir.path().join("missing.json")).is_err());
    }
}
