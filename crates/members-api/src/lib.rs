pub mod admin;
pub mod auth;
pub mod club;
pub mod config;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod session;
pub mod validation;
pub mod views;

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router,
    routing::{get, post},
};
use tracing::error;

use members_db::Database;

use crate::config::Config;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: Config,
}

/// All board routes, with the current user resolved before every handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(messages::home))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/join-club", get(club::join_club_page).post(club::join_club))
        .route(
            "/new-message",
            get(messages::new_message_page).post(messages::new_message),
        )
        .route("/delete-message/{id}", post(messages::delete_message))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_user,
        ))
        .with_state(state)
}

/// Run a blocking DB call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow!("DB task failed: {}", e)
        })?
}
