use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

use axum::{
    Extension, Form,
    extract::{State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use members_db::is_constraint_violation;
use members_types::api::{LoginForm, SignupForm};
use members_types::models::User;

use crate::middleware::CurrentUser;
use crate::session::{removal_cookie, session_cookie};
use crate::validation::{MALFORMED_FORM, validate_login, validate_signup};
use crate::{AppState, run_db, views};

pub const SIGNUP_FAILED: &str = "Could not create account";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const LOGIN_FAILED: &str = "Could not log in, please try again";

/// Stand-in hash verified when a login names an unknown account.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("members-only-placeholder").ok());

/// Salted Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Checks `password` against the account's hash. A missing account is checked
/// against a fixed stand-in hash so both outcomes cost one verification.
pub fn authenticate<V>(stored_hash: Option<&str>, password: &str, verify: V) -> bool
where
    V: Fn(&str, &str) -> bool,
{
    match stored_hash {
        Some(hash) => verify(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify(password, dummy);
            }
            false
        }
    }
}

// -- Signup --

pub async fn signup_page(Extension(CurrentUser(viewer)): Extension<CurrentUser>) -> Html<String> {
    render_signup(viewer.as_ref(), None)
}

pub async fn signup(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    jar: CookieJar,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        warn!("Undecodable signup form");
        return render_signup(viewer.as_ref(), Some(MALFORMED_FORM)).into_response();
    };

    let new_user = match validate_signup(form) {
        Ok(new_user) => new_user,
        Err(e) => return render_signup(viewer.as_ref(), Some(&e.to_string())).into_response(),
    };

    let created = run_db(&state, move |db| {
        let password_hash = hash_password(&new_user.password)?;
        db.create_user(
            &new_user.first_name,
            &new_user.last_name,
            &new_user.email,
            &password_hash,
        )
    })
    .await;

    let user_id = match created {
        Ok(id) => id,
        Err(e) => {
            if is_constraint_violation(&e) {
                warn!("Signup rejected: email already registered");
            } else {
                error!("Signup failed: {:#}", e);
            }
            return render_signup(viewer.as_ref(), Some(SIGNUP_FAILED)).into_response();
        }
    };

    match session_cookie(&state.config, user_id) {
        Ok(cookie) => {
            info!("User {} signed up", user_id);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Err(e) => {
            error!("Session token for new user {} failed: {:#}", user_id, e);
            render_signup(viewer.as_ref(), Some(SIGNUP_FAILED)).into_response()
        }
    }
}

fn render_signup(viewer: Option<&User>, error: Option<&str>) -> Html<String> {
    Html(views::layout(viewer, &views::signup_form(error)))
}

// -- Login --

pub async fn login_page(Extension(CurrentUser(viewer)): Extension<CurrentUser>) -> Html<String> {
    render_login(viewer.as_ref(), None)
}

/// Unknown email and wrong password produce the same response.
pub async fn login(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        warn!("Undecodable login form");
        return render_login(viewer.as_ref(), Some(MALFORMED_FORM)).into_response();
    };

    let creds = match validate_login(form) {
        Ok(creds) => creds,
        Err(e) => return render_login(viewer.as_ref(), Some(&e.to_string())).into_response(),
    };

    let verified = run_db(&state, move |db| {
        let row = db.get_user_by_email(&creds.email)?;
        let stored_hash = row.as_ref().map(|r| r.password.as_str());
        let ok = authenticate(stored_hash, &creds.password, verify_password);
        Ok(row.filter(|_| ok).map(|r| r.id))
    })
    .await;

    let user_id = match verified {
        Ok(Some(id)) => id,
        Ok(None) => {
            info!("Rejected login attempt");
            return render_login(viewer.as_ref(), Some(INVALID_CREDENTIALS)).into_response();
        }
        Err(e) => {
            error!("Login failed: {:#}", e);
            return render_login(viewer.as_ref(), Some(LOGIN_FAILED)).into_response();
        }
    };

    match session_cookie(&state.config, user_id) {
        Ok(cookie) => {
            info!("User {} logged in", user_id);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Err(e) => {
            error!("Session token for user {} failed: {:#}", user_id, e);
            render_login(viewer.as_ref(), Some(LOGIN_FAILED)).into_response()
        }
    }
}

fn render_login(viewer: Option<&User>, error: Option<&str>) -> Html<String> {
    Html(views::layout(viewer, &views::login_form(error)))
}

// -- Logout --

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(removal_cookie()), Redirect::to("/"))
}
