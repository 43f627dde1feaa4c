//! Bridging `CookieStore` to HTTP headers

use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use courier_core::models::Navigation;
use courier_core::ClientConfig;
use courier_services::RequestCookies;

/// Cookies of the incoming request. Writes are `HttpOnly`, and `Secure` when the site is https.
pub fn request_cookies(headers: &HeaderMap, config: &ClientConfig) -> RequestCookies {
    let header = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    RequestCookies::from_header(Some(header.as_str()))
        .with_attributes(true, config.secure_cookies())
}

/// Append the pending `Set-Cookie` values to `response`.
pub fn with_set_cookies(mut response: Response, cookies: &RequestCookies) -> Response {
    let headers = response.headers_mut();
    for value in cookies.set_cookie_headers() {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping unencodable Set-Cookie value"),
        }
    }
    response
}

/// Turn a navigation effect into a `303 See Other`.
pub fn navigate(navigation: &Navigation) -> Response {
    match HeaderValue::from_str(&navigation.location) {
        Ok(location) => (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response(),
        Err(e) => {
            tracing::error!(error = %e, location = %navigation.location, "Invalid redirect location");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
