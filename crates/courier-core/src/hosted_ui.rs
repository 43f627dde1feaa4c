//! URLs of the provider-hosted login UI and token endpoint

use crate::constants::OAUTH_SCOPES;

/// Addresses of one user pool's hosted login domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedUi {
    pub domain_name: String,
    pub region: String,
    pub client_id: String,
    pub user_pool_id: String,
    /// Where the hosted login sends the browser back with `?code=`
    pub callback_url: String,
    base_url_override: Option<String>,
}

impl HostedUi {
    pub fn new(
        domain_name: impl Into<String>,
        region: impl Into<String>,
        client_id: impl Into<String>,
        user_pool_id: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            region: region.into(),
            client_id: client_id.into(),
            user_pool_id: user_pool_id.into(),
            callback_url: callback_url.into(),
            base_url_override: None,
        }
    }

    /// Point the login and token URLs at another host (local stubs, custom domains).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn base_url(&self) -> String {
        match &self.base_url_override {
            Some(url) => url.clone(),
            None => format!(
                "https://{}.auth.{}.amazoncognito.com",
                self.domain_name, self.region
            ),
        }
    }

    /// `{base}/login?client_id=..&response_type=code&scope=email+openid+profile&redirect_uri=..`
    pub fn login_url(&self) -> String {
        format!(
            "{}/login?client_id={}&response_type=code&scope={}&redirect_uri={}",
            self.base_url(),
            urlencoding::encode(&self.client_id),
            OAUTH_SCOPES.join("+"),
            urlencoding::encode(&self.callback_url),
        )
    }

    pub fn logout_url(&self) -> String {
        format!(
            "{}/logout?client_id={}&logout_uri={}",
            self.base_url(),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
        )
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/token", self.base_url())
    }

    /// Key under which the identity token is presented to the federation pool.
    pub fn provider_login_key(&self) -> String {
        format!(
            "cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }
}
