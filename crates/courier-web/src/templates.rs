//! Page templates

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use courier_core::models::UploadStatus;

use crate::error::HttpAppError;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub upload_path: String,
    pub email: Option<String>,
}

/// Shown on the callback page while (or after failing) to exchange the code
#[derive(Template)]
#[template(path = "authorizing.html")]
pub struct AuthorizingTemplate;

#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub upload_path: String,
    pub prefix: String,
    pub status: Option<UploadStatus>,
}

pub fn render<T: Template>(template: &T) -> Result<Response, HttpAppError> {
    let html = template.render()?;
    Ok(Html(html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_template_renders_status_class() {
        let html = UploadTemplate {
            upload_path: "/upload".to_string(),
            prefix: "docs".to_string(),
            status: Some(UploadStatus::success()),
        }
        .render()
        .unwrap();

        assert!(html.contains(r#"<p class="success">Complete!!</p>"#));
        assert!(html.contains(r#"value="docs""#));
    }

    #[test]
    fn test_upload_template_escapes_status_message() {
        let html = UploadTemplate {
            upload_path: "/upload".to_string(),
            prefix: String::new(),
            status: Some(UploadStatus {
                class_name: "failure".to_string(),
                message: "Error!! (<script>)".to_string(),
            }),
        }
        .render()
        .unwrap();

        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_authorizing_template() {
        let html = AuthorizingTemplate.render().unwrap();
        assert!(html.contains("authorizing..."));
    }
}
