use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::config::AppConfig;
use crate::database::Store;

/// Shared application state handed to every handler and middleware.
/// Per-request context (tenant, caller) travels in the request, never here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            auth,
        }
    }
}
