//! Courier CLI library: helpers shared by the `courier` binary

use std::path::Path;

use anyhow::Context;
use courier_core::models::Navigation;
use courier_core::stack::{StackContext, StackOutputs};
use courier_services::{Navigator, UploadFile};
use serde_json::{json, Value};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Prints each navigation so the user can open it in a browser
#[derive(Debug, Default)]
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, navigation: &Navigation) {
        println!("{}", navigation.location);
    }
}

/// Query part of a pasted callback URL. A bare query string is accepted as-is.
pub fn callback_query(callback_url: &str) -> &str {
    match callback_url.split_once('?') {
        Some((_, query)) => query.split('#').next().unwrap_or_default(),
        None if callback_url.contains('=') => callback_url,
        None => "",
    }
}

/// Read a local file into an upload, named after its final path component.
pub async fn read_upload_file(path: &Path) -> anyhow::Result<UploadFile> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(UploadFile::new(filename, data))
}

/// Everything provisioning derives from the context, plus the deployed outputs when known.
pub fn stack_report(context: &StackContext, outputs: Option<&StackOutputs>) -> Value {
    let mut report = json!({
        "context": context,
        "resources": context.resource_names(),
        "callbackUrl": context.callback_url(),
        "logoutUrl": context.logout_url(),
        "oauthScopes": context.oauth_scopes(),
        "corsRule": context.cors_rule(),
        "authenticatedRolePolicy": context.authenticated_role_policy(),
    });

    if let Some(outputs) = outputs {
        report["outputs"] = json!(outputs);
        if let Some(pool_id) = outputs.identity_pool_id.as_deref() {
            report["trustConditions"] = json!({
                "authenticated": context.authenticated_trust_condition(pool_id),
                "unauthenticated": context.unauthenticated_trust_condition(pool_id),
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> StackContext {
        StackContext {
            project_name: "courier".to_string(),
            cognito_domain_name: "courier-demo".to_string(),
            client_app_url: "http://localhost:3000".to_string(),
        }
    }

    #[test]
    fn test_callback_query() {
        assert_eq!(
            callback_query("http://localhost:3000/auth?code=abc&state=x"),
            "code=abc&state=x"
        );
        assert_eq!(callback_query("http://localhost:3000/auth?code=abc#top"), "code=abc");
        assert_eq!(callback_query("code=abc"), "code=abc");
        assert_eq!(callback_query("http://localhost:3000/auth"), "");
    }

    #[tokio::test]
    async fn test_read_upload_file_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let file = read_upload_file(&path).await.unwrap();
        assert_eq!(file.filename, "notes.txt");
        assert_eq!(&file.data[..], b"hello");
    }

    #[tokio::test]
    async fn test_read_upload_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_upload_file(&dir.path().join("absent.bin")).await.is_err());
    }

    #[test]
    fn test_stack_report_without_outputs() {
        let report = stack_report(&context(), None);
        assert_eq!(report["callbackUrl"], "http://localhost:3000/auth");
        assert!(report.get("outputs").is_none());
        assert!(report.get("trustConditions").is_none());
    }

    #[test]
    fn test_stack_report_with_outputs() {
        let outputs = StackOutputs {
            identity_pool_id: Some("ap-northeast-1:pool".to_string()),
            ..StackOutputs::default()
        };
        let report = stack_report(&context(), Some(&outputs));
        assert_eq!(report["outputs"]["identity_pool_id"], "ap-northeast-1:pool");
        assert!(report["trustConditions"]["authenticated"].is_object());
    }
}
