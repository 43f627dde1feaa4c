use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Security headers configuration
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    pub is_production: bool,
    /// Hosted login origin, allowed as a form and navigation target
    pub login_origin: String,
}

impl SecurityHeadersConfig {
    pub fn new(login_origin: String, is_production: bool) -> Self {
        Self {
            is_production,
            login_origin,
        }
    }

    /// Build Content-Security-Policy header value
    fn build_csp(&self) -> String {
        [
            "default-src 'self'".to_string(),
            "script-src 'none'".to_string(),
            "style-src 'self'".to_string(),
            "img-src 'self' data:".to_string(),
            format!("form-action 'self' {}", self.login_origin),
            "frame-ancestors 'none'".to_string(),
        ]
        .join("; ")
    }
}

/// Security headers middleware
/// Adds security headers to all HTTP responses
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    // Keep the authorization code in the callback URL from leaking to other origins
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    // HSTS header (only set in production over HTTPS)
    if config.is_production {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if let Ok(header_value) = HeaderValue::from_str(&config.build_csp()) {
        headers.insert("Content-Security-Policy", header_value);
    }

    // Pages carry per-user upload status and tokens in Set-Cookie
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, private"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_allows_login_origin_as_form_target() {
        let config = SecurityHeadersConfig::new(
            "https://courier-demo.auth.us-east-1.amazoncognito.com".to_string(),
            false,
        );
        let csp = config.build_csp();
        assert!(csp.contains(
            "form-action 'self' https://courier-demo.auth.us-east-1.amazoncognito.com"
        ));
        assert!(csp.contains("frame-ancestors 'none'"));
    }
}
