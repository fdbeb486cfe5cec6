/**
 * Application State
 *
 * The central state container handed to the router. Services are cheap
 * clones over the shared store handle; the identity port and the auth
 * bridge are explicit fields, never process-global state.
 *
 * `FromRef` implementations let handlers extract just the service they
 * need instead of the whole `AppState`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{AuthBridge, IdentityProvider};
use crate::categories::CategoryService;
use crate::messages::MessageService;
use crate::profiles::ProfileService;
use crate::server::config::Config;
use crate::stats::StatsService;
use crate::store::DocumentStore;
use crate::threads::ThreadService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub bridge: Arc<AuthBridge>,
    pub categories: CategoryService,
    pub threads: ThreadService,
    pub messages: MessageService,
    pub profiles: ProfileService,
    pub stats: StatsService,
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn DocumentStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<AuthBridge> {
    fn from_ref(state: &AppState) -> Self {
        state.bridge.clone()
    }
}

impl FromRef<AppState> for CategoryService {
    fn from_ref(state: &AppState) -> Self {
        state.categories.clone()
    }
}

impl FromRef<AppState> for ThreadService {
    fn from_ref(state: &AppState) -> Self {
        state.threads.clone()
    }
}

impl FromRef<AppState> for MessageService {
    fn from_ref(state: &AppState) -> Self {
        state.messages.clone()
    }
}

impl FromRef<AppState> for ProfileService {
    fn from_ref(state: &AppState) -> Self {
        state.profiles.clone()
    }
}

impl FromRef<AppState> for StatsService {
    fn from_ref(state: &AppState) -> Self {
        state.stats.clone()
    }
}
