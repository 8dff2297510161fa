use axum::{
    Extension, Form,
    extract::{Path, State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, error, info, warn};

use members_db::models::MessageRow;
use members_types::api::NewMessageForm;
use members_types::models::{Message, User};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::validation::{MALFORMED_FORM, validate_message};
use crate::{AppState, run_db, views};

pub const SAVE_FAILED: &str = "Could not save message";

/// Public listing, newest first. Metadata and controls depend on the viewer's flags.
pub async fn home(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
) -> Result<Html<String>, AppError> {
    let rows = run_db(&state, |db| db.list_messages()).await?;
    let messages: Vec<Message> = rows.into_iter().map(MessageRow::into_message).collect();

    let body = views::message_list(&messages, viewer.as_ref());
    Ok(Html(views::layout(viewer.as_ref(), &body)))
}

pub async fn new_message_page(Extension(CurrentUser(viewer)): Extension<CurrentUser>) -> Response {
    match viewer {
        Some(ref user) => render(user, None).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

pub async fn new_message(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    form: Result<Form<NewMessageForm>, FormRejection>,
) -> Response {
    let Some(user) = viewer else {
        return Redirect::to("/login").into_response();
    };

    let Ok(Form(form)) = form else {
        warn!("Undecodable message form from user {}", user.id);
        return render(&user, Some(MALFORMED_FORM)).into_response();
    };

    let message = match validate_message(form) {
        Ok(message) => message,
        Err(e) => return render(&user, Some(&e.to_string())).into_response(),
    };

    let author_id = user.id;
    let inserted = run_db(&state, move |db| {
        db.insert_message(&message.title, &message.content, author_id)
    })
    .await;

    match inserted {
        Ok(id) => {
            info!("User {} posted message {}", author_id, id);
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!("Saving message for user {} failed: {:#}", author_id, e);
            render(&user, Some(SAVE_FAILED)).into_response()
        }
    }
}

/// Admin only. Every outcome, including refusal, is a redirect home.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Redirect {
    let Some(admin) = viewer.filter(User::can_delete_messages) else {
        return Redirect::to("/");
    };

    let Ok(message_id) = id.parse::<i64>() else {
        debug!("Ignoring delete for non-numeric id {:?}", id);
        return Redirect::to("/");
    };

    match run_db(&state, move |db| db.delete_message(message_id)).await {
        Ok(true) => info!("Admin {} deleted message {}", admin.id, message_id),
        Ok(false) => debug!("Message {} already gone", message_id),
        Err(e) => error!("Deleting message {} failed: {:#}", message_id, e),
    }

    Redirect::to("/")
}

fn render(user: &User, error: Option<&str>) -> Html<String> {
    Html(views::layout(Some(user), &views::new_message_form(error)))
}
