//! Names and fixed values of the authorization handshake.

/// Cookie holding the identity token issued by the hosted login.
pub const ID_TOKEN_COOKIE: &str = "id_token";

/// Cookie holding the refresh token. Written on login, never read back.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// OAuth scopes requested from the hosted login page, in URL order.
pub const OAUTH_SCOPES: [&str; 3] = ["email", "openid", "profile"];

/// Grant type used at the token endpoint.
pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";

pub const DEFAULT_CALLBACK_PATH: &str = "/auth";
pub const DEFAULT_UPLOAD_PATH: &str = "/upload";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Status shown after a successful object put.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Complete!!";
pub const STATUS_CLASS_SUCCESS: &str = "success";
pub const STATUS_CLASS_FAILURE: &str = "failure";
