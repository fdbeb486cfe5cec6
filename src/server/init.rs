/**
 * Server Initialization
 *
 * Assembles the application from configuration:
 *
 * 1. Pick the document store (sqlite when `DATABASE_URL` is set and
 *    reachable, otherwise in-memory with a warning)
 * 2. Pick the verification mailer (SMTP when configured, log otherwise)
 * 3. Wire the identity adapter, forum services, and the auth bridge
 * 4. Build the router
 *
 * Initialization is resilient: a missing or broken database degrades to
 * the memory store instead of preventing startup.
 */

use std::sync::Arc;

use axum::Router;

use crate::auth::{AuthBridge, LocalIdentity, LogMailer, SmtpMailer, VerificationMailer};
use crate::categories::CategoryService;
use crate::messages::MessageService;
use crate::profiles::ProfileService;
use crate::routes::create_router;
use crate::server::config::Config;
use crate::server::state::AppState;
use crate::stats::StatsService;
use crate::store::{DocumentStore, MemoryStore, SqliteStore};
use crate::threads::ThreadService;

async fn load_store(config: &Config) -> Arc<dyn DocumentStore> {
    let Some(url) = &config.database_url else {
        return Arc::new(MemoryStore::new());
    };

    match SqliteStore::connect(url).await {
        Ok(store) => {
            tracing::info!("connected to sqlite store at {}", url);
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!("failed to open sqlite store at {}: {}", url, e);
            tracing::warn!("falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

fn load_mailer(config: &Config) -> Arc<dyn VerificationMailer> {
    let Some(smtp) = &config.smtp else {
        return Arc::new(LogMailer);
    };

    match SmtpMailer::new(smtp) {
        Ok(mailer) => {
            tracing::info!("verification mail via SMTP relay {}", smtp.host);
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::error!("SMTP mailer setup failed: {}", e);
            tracing::warn!("falling back to logged verification links");
            Arc::new(LogMailer)
        }
    }
}

/// Build the application router from configuration.
pub async fn create_app(config: Config) -> Router<()> {
    tracing::info!("initializing forum server");

    let config = Arc::new(config);
    let store = load_store(&config).await;
    let mailer = load_mailer(&config);

    let identity: Arc<dyn crate::auth::IdentityProvider> = Arc::new(LocalIdentity::new(
        store.clone(),
        mailer,
        config.session_secret.clone(),
        config.public_base_url.clone(),
    ));

    let categories = CategoryService::new(store.clone());
    let threads = ThreadService::new(store.clone());
    let messages = MessageService::new(store.clone());
    let profiles = ProfileService::new(store.clone());
    let stats = StatsService::new(categories.clone(), threads.clone(), messages.clone());
    let bridge = Arc::new(AuthBridge::new(identity.clone(), profiles.clone()));

    let state = AppState {
        config,
        store,
        identity,
        bridge,
        categories,
        threads,
        messages,
        profiles,
        stats,
    };

    create_router(state)
}
