use axum::{
    Extension, Form,
    extract::{State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{error, info, warn};

use members_types::api::JoinClubForm;
use members_types::models::User;

use crate::middleware::CurrentUser;
use crate::validation::MALFORMED_FORM;
use crate::{AppState, run_db, views};

pub const INVALID_CODE: &str = "Invalid secret code";
pub const UPGRADE_FAILED: &str = "Could not update membership";

/// Viewable by anyone, signed in or not.
pub async fn join_club_page(
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
) -> Html<String> {
    render(viewer.as_ref(), None)
}

/// The update only applies when a user is resolved and the shared code matches.
pub async fn join_club(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    form: Result<Form<JoinClubForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        warn!("Undecodable join-club form");
        return render(viewer.as_ref(), Some(MALFORMED_FORM)).into_response();
    };

    let user = match viewer {
        Some(ref user) if form.secret_code == state.config.club_secret => user,
        _ => return render(viewer.as_ref(), Some(INVALID_CODE)).into_response(),
    };

    let user_id = user.id;
    match run_db(&state, move |db| db.set_member(user_id)).await {
        Ok(()) => {
            info!("User {} joined the club", user_id);
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!("Membership upgrade for user {} failed: {:#}", user_id, e);
            render(viewer.as_ref(), Some(UPGRADE_FAILED)).into_response()
        }
    }
}

fn render(viewer: Option<&User>, error: Option<&str>) -> Html<String> {
    Html(views::layout(viewer, &views::join_club_form(error)))
}
