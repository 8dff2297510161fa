use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use members_types::models::User;

use crate::session::{SESSION_COOKIE, verify_token};
use crate::{AppState, run_db};

/// The signed-in user for this request, `None` when anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Verify the session cookie and load its user. Never rejects a request:
/// a missing, forged or expired cookie and an unknown id all mean anonymous.
pub async fn resolve_user(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let user_id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| verify_token(&state.config.session_secret, cookie.value()));

    let user = match user_id {
        Some(id) => match run_db(&state, move |db| db.get_user_by_id(id)).await {
            Ok(row) => row.map(|r| r.into_user()),
            Err(e) => {
                warn!("Session lookup for user {} failed: {:#}", id, e);
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}
