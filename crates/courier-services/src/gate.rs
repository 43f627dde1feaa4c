//! Authorization gate
//!
//! Decides on every page load whether the visitor may see the page or must be
//! sent to the hosted login. The callback page is always let through so the code
//! exchange can run there.

use std::sync::Arc;

use courier_core::constants::ID_TOKEN_COOKIE;
use courier_core::models::{IdentityToken, Navigation, TokenClaims};
use courier_core::HostedUi;

use crate::clock::Clock;
use crate::cookies::CookieStore;
use crate::navigator::Navigator;

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Current page is the login callback; no token is required there
    Callback,
    /// A well-formed, unexpired identity token is present
    Authorized(TokenClaims),
    /// Send the browser to the hosted login
    Redirect(Navigation),
}

impl GateDecision {
    pub fn is_authorized(&self) -> bool {
        !matches!(self, GateDecision::Redirect(_))
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        match self {
            GateDecision::Redirect(navigation) => Some(navigation),
            _ => None,
        }
    }
}

pub struct AuthorizationGate {
    hosted_ui: HostedUi,
    callback_path: String,
    clock: Arc<dyn Clock>,
}

impl AuthorizationGate {
    pub fn new(hosted_ui: HostedUi, callback_path: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            hosted_ui,
            callback_path: callback_path.into(),
            clock,
        }
    }

    pub fn login_navigation(&self) -> Navigation {
        Navigation::to(self.hosted_ui.login_url())
    }

    /// `path` is the callback path itself, or the callback path followed by a query or subpath.
    pub fn is_callback(&self, path: &str) -> bool {
        match path.strip_prefix(self.callback_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
            None => false,
        }
    }

    /// Check the current path (optionally with its query) against the cookie state.
    pub fn check(&self, current_path: &str, cookies: &dyn CookieStore) -> GateDecision {
        if self.is_callback(current_path) {
            return GateDecision::Callback;
        }

        let Some(raw) = cookies.get(ID_TOKEN_COOKIE).filter(|t| !t.is_empty()) else {
            tracing::warn!(path = %current_path, "No cookie");
            return GateDecision::Redirect(self.login_navigation());
        };

        let claims = match IdentityToken::new(raw).claims() {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(path = %current_path, error = %e, "Unreadable token");
                return GateDecision::Redirect(self.login_navigation());
            }
        };

        if claims.is_expired_at(self.clock.now()) {
            tracing::warn!(path = %current_path, exp = claims.exp, "Expired token");
            return GateDecision::Redirect(self.login_navigation());
        }

        GateDecision::Authorized(claims)
    }

    /// Boolean form of `check`: performs the redirect through `navigator` when unauthorized.
    pub fn authorize(
        &self,
        current_path: &str,
        cookies: &dyn CookieStore,
        navigator: &dyn Navigator,
    ) -> bool {
        let decision = self.check(current_path, cookies);
        if let Some(navigation) = decision.navigation() {
            navigator.navigate(navigation);
        }
        decision.is_authorized()
    }
}
