/**
 * Router Configuration
 *
 * Two layers:
 *
 * - the guarded page/API routes, wrapped in the session guard middleware
 *   (one enforcement path for every page route)
 * - the unguarded surface: `/health`, static assets under `/static`, and
 *   the 404 fallback
 */

use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Json, Router};
use tower_http::services::ServeDir;

use crate::auth::handlers as auth;
use crate::middleware::session_guard;
use crate::server::state::AppState;
use crate::{categories, messages, profiles, stats, threads};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the full application router.
pub fn create_router(state: AppState) -> Router<()> {
    let guarded = Router::new()
        .route("/", get(stats::handlers::home))
        // auth flows
        .route("/register", axum::routing::post(auth::register::register))
        .route("/login", axum::routing::post(auth::login::login))
        .route("/google", axum::routing::post(auth::google::google))
        .route("/logout", axum::routing::post(auth::logout::logout))
        .route("/me", get(auth::me::me))
        .route("/verify-email", get(auth::verify::status))
        .route("/verify-email/send", axum::routing::post(auth::verify::send))
        .route("/verify-email/confirm", get(auth::verify::confirm))
        // categories
        .route(
            "/categories",
            get(categories::handlers::list).post(categories::handlers::create),
        )
        .route("/categories/subscribe", get(categories::handlers::subscribe))
        .route(
            "/categories/{id}",
            get(categories::handlers::get)
                .patch(categories::handlers::update)
                .delete(categories::handlers::delete),
        )
        .route(
            "/categories/{id}/threads",
            get(categories::handlers::threads),
        )
        .route(
            "/categories/{id}/threads/subscribe",
            get(categories::handlers::subscribe_threads),
        )
        // threads and messages
        .route("/threads", axum::routing::post(threads::handlers::create))
        .route("/threads/{id}", get(threads::handlers::get))
        .route(
            "/threads/{id}/messages",
            get(messages::handlers::list).post(messages::handlers::post),
        )
        .route(
            "/threads/{id}/messages/subscribe",
            get(messages::handlers::subscribe),
        )
        // profiles
        .route("/users/{id}", get(profiles::handlers::get))
        .route("/profile", axum::routing::patch(profiles::handlers::update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_guard,
        ));

    Router::new()
        .merge(guarded)
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("public"))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "not found", "status": 404 })),
            )
        })
        .with_state(state)
}
