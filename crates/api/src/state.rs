use std::sync::Arc;
use std::time::Duration;

use admission_client::AdmissionService;
use admission_core::permissions::TabPermissionResolver;

use crate::config::ServerConfig;
use crate::session::SessionStore;
use crate::tabs::TabRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Remote admission service.
    pub service: Arc<dyn AdmissionService>,
    /// Read/update rules of the wizard tabs.
    pub permissions: Arc<TabPermissionResolver>,
    /// Form handler of every writable tab.
    pub tabs: Arc<TabRegistry>,
    /// One-shot notices kept between two requests of a candidate.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: ServerConfig, service: Arc<dyn AdmissionService>) -> Self {
        let sessions = SessionStore::with_ttl(Duration::from_secs(config.session_ttl_secs));
        Self {
            config: Arc::new(config),
            service,
            permissions: Arc::new(TabPermissionResolver::default()),
            tabs: Arc::new(TabRegistry::default()),
            sessions: Arc::new(sessions),
        }
    }
}
