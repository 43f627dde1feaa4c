//! Application state

use std::sync::Arc;

use courier_core::ClientConfig;
use courier_services::{
    AuthorizationGate, Clock, CodeExchange, CredentialProvider, FederatedUpload, TokenEndpoint,
};
use courier_storage::Storage;

/// Shared by every handler. Holds no per-user state.
pub struct AppState {
    pub config: ClientConfig,
    pub gate: AuthorizationGate,
    pub exchange: CodeExchange,
    pub upload: FederatedUpload,
}

impl AppState {
    /// Wire the handshake and upload flows from their collaborators.
    pub fn new(
        config: ClientConfig,
        token_endpoint: Arc<dyn TokenEndpoint>,
        credentials: Arc<dyn CredentialProvider>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let hosted_ui = config.hosted_ui();

        let gate = AuthorizationGate::new(
            hosted_ui.clone(),
            config.callback_path.clone(),
            clock.clone(),
        );
        let exchange = CodeExchange::new(hosted_ui.clone(), token_endpoint, config.upload_url());
        let upload = FederatedUpload::new(
            hosted_ui.provider_login_key(),
            config.bucket(),
            credentials,
            storage,
            clock,
        );

        Self {
            config,
            gate,
            exchange,
            upload,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert<T: Send + Sync>() {}
    assert::<AppState>();
}
