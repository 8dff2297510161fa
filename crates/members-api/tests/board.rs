use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use tower::ServiceExt;

use members_api::config::Config;
use members_api::session::{SESSION_COOKIE, create_token};
use members_api::{AppState, AppStateInner, router};
use members_db::Database;

struct Board {
    state: AppState,
    app: Router,
}

impl Board {
    fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            config: Config::development(),
        });
        let app = router(state.clone());
        Self { state, app }
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::get(path);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn post(&self, path: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(req.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Signs up through the HTTP surface and returns the `Cookie` header value.
    async fn signup(&self, first: &str, email: &str) -> String {
        let form = format!(
            "firstName={first}&lastName=Tester&email={email}&password=secret1&confirmPassword=secret1"
        );
        let res = self.post("/signup", &form, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        session_from(&res).expect("signup issues a session cookie")
    }

    async fn home(&self, cookie: Option<&str>) -> String {
        let res = self.get("/", cookie).await;
        assert_eq!(res.status(), StatusCode::OK);
        body_text(res).await
    }

    fn message_count(&self) -> i64 {
        self.state.db.count_messages().unwrap()
    }
}

fn session_from(res: &Response) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{SESSION_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(res: &Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_text(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// -- Signup --

#[tokio::test]
async fn signup_creates_user_and_session() {
    let board = Board::new();
    let res = board
        .post(
            "/signup",
            "firstName=A&lastName=B&email=a%40b.com&password=secret1&confirmPassword=secret1",
            None,
        )
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cookie = session_from(&res).unwrap();
    assert_eq!(board.state.db.count_users_with_email("a@b.com").unwrap(), 1);

    let row = board.state.db.get_user_by_email("a@b.com").unwrap().unwrap();
    assert!(!row.is_member);
    assert!(!row.is_admin);
    assert!(row.password.starts_with("$argon2"));

    let home = board.home(Some(&cookie)).await;
    assert!(home.contains("Welcome, A!"));
}

#[tokio::test]
async fn repeated_signup_never_duplicates_email() {
    let board = Board::new();
    let form = "firstName=A&lastName=B&email=a%40b.com&password=secret1&confirmPassword=secret1";
    assert_eq!(board.post("/signup", form, None).await.status(), StatusCode::SEE_OTHER);

    let res = board.post("/signup", form, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_from(&res).is_none());
    assert!(body_text(res).await.contains("Could not create account"));
    assert_eq!(board.state.db.count_users_with_email("a@b.com").unwrap(), 1);
}

#[tokio::test]
async fn mismatched_confirmation_writes_nothing() {
    let board = Board::new();
    let res = board
        .post(
            "/signup",
            "firstName=A&lastName=B&email=a%40b.com&password=secret1&confirmPassword=secret2",
            None,
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Passwords don&#39;t match"));
    assert_eq!(board.state.db.count_users_with_email("a@b.com").unwrap(), 0);
}

#[tokio::test]
async fn missing_fields_are_validation_errors() {
    let board = Board::new();
    let res = board.post("/signup", "email=a%40b.com", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("First name is required"));
}

#[tokio::test]
async fn undecodable_forms_rerender() {
    let board = Board::new();
    let res = board
        .post(
            "/signup",
            "firstName=A&firstName=Z&lastName=B&email=a%40b.com&password=secret1&confirmPassword=secret1",
            None,
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_from(&res).is_none());
    let body = body_text(res).await;
    assert!(body.contains("Invalid form submission"));
    assert!(body.contains("<h1>Sign Up</h1>"));
    assert!(!body.contains("duplicate field"));
    assert_eq!(board.state.db.count_users_with_email("a@b.com").unwrap(), 0);

    let res = board
        .post("/login", "email=a%40b.com&email=c%40d.com&password=x", None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Invalid form submission"));

    let cookie = board.signup("Ada", "ada%40example.com").await;
    let res = board
        .post("/new-message", "title=a&title=b&content=c", Some(&cookie))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Invalid form submission"));
    assert_eq!(board.message_count(), 0);
}

// -- Login / logout --

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let board = Board::new();
    board.signup("Ada", "ada%40example.com").await;

    let wrong_password = board
        .post("/login", "email=ada%40example.com&password=nope123", None)
        .await;
    let unknown_email = board
        .post("/login", "email=ghost%40example.com&password=nope123", None)
        .await;

    assert_eq!(wrong_password.status(), StatusCode::OK);
    assert_eq!(unknown_email.status(), StatusCode::OK);
    assert!(session_from(&wrong_password).is_none());

    let a = body_text(wrong_password).await;
    let b = body_text(unknown_email).await;
    assert!(a.contains("Invalid email or password"));
    assert_eq!(a, b);
}

#[tokio::test]
async fn login_issues_session() {
    let board = Board::new();
    board.signup("Ada", "ada%40example.com").await;

    let res = board
        .post("/login", "email=ada%40example.com&password=secret1", None)
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let cookie = session_from(&res).unwrap();
    assert!(board.home(Some(&cookie)).await.contains("Welcome, Ada!"));
}

#[tokio::test]
async fn logout_clears_cookie() {
    let board = Board::new();
    let cookie = board.signup("Ada", "ada%40example.com").await;

    let res = board.post("/logout", "", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(session_from(&res).as_deref(), Some("members_session="));
}

// -- Session resolution --

#[tokio::test]
async fn forged_sessions_are_anonymous() {
    let board = Board::new();
    board.signup("Ada", "ada%40example.com").await;
    let user_id = board.state.db.get_user_by_email("ada@example.com").unwrap().unwrap().id;

    let foreign = create_token("some-other-secret", user_id, 1).unwrap();
    let home = board.home(Some(&format!("{SESSION_COOKIE}={foreign}"))).await;
    assert!(home.contains(r#"href="/login""#));
    assert!(!home.contains("Welcome"));

    let home = board.home(Some(&format!("{SESSION_COOKIE}=garbage"))).await;
    assert!(!home.contains("Welcome"));

    // Valid signature for an id that does not exist.
    let secret = &board.state.config.session_secret;
    let orphan = create_token(secret, user_id + 50, 1).unwrap();
    let home = board.home(Some(&format!("{SESSION_COOKIE}={orphan}"))).await;
    assert!(!home.contains("Welcome"));
}

// -- Membership --

#[tokio::test]
async fn membership_reveals_metadata() {
    let board = Board::new();
    let cookie = board.signup("Ada", "ada%40example.com").await;

    let res = board
        .post("/new-message", "title=Hello&content=First+post", Some(&cookie))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let home = board.home(Some(&cookie)).await;
    assert!(home.contains("First post"));
    assert!(!home.contains("By:"));

    let res = board.post("/join-club", "secretCode=wrong", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Invalid secret code"));
    assert!(!board.home(Some(&cookie)).await.contains("By:"));

    let res = board
        .post("/join-club", "secretCode=supersecret", Some(&cookie))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let home = board.home(Some(&cookie)).await;
    assert!(home.contains("By: Ada Tester"));

    // Re-submitting is harmless.
    let res = board
        .post("/join-club", "secretCode=supersecret", Some(&cookie))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn anonymous_join_club_never_upgrades() {
    let board = Board::new();

    let res = board.get("/join-club", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Join the Club"));

    let res = board.post("/join-club", "secretCode=supersecret", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Invalid secret code"));
}

// -- Messages --

#[tokio::test]
async fn new_message_requires_login() {
    let board = Board::new();

    let res = board.get("/new-message", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let res = board.post("/new-message", "title=t&content=c", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    assert_eq!(board.message_count(), 0);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let board = Board::new();
    let cookie = board.signup("Ada", "ada%40example.com").await;

    let res = board.get("/new-message", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = board
        .post("/new-message", "title=Hello&content=", Some(&cookie))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Content is required"));
    assert_eq!(board.message_count(), 0);
}

#[tokio::test]
async fn home_is_public_and_escaped() {
    let board = Board::new();
    let cookie = board.signup("Ada", "ada%40example.com").await;
    board
        .post(
            "/new-message",
            "title=%3Cscript%3Ealert(1)%3C%2Fscript%3E&content=hi",
            Some(&cookie),
        )
        .await;

    let home = board.home(None).await;
    assert!(home.contains("&lt;script&gt;"));
    assert!(!home.contains("<script>"));
    assert!(!home.contains("By:"));
}

// -- Deletion --

#[tokio::test]
async fn non_admin_delete_is_silent_noop() {
    let board = Board::new();
    let cookie = board.signup("Ada", "ada%40example.com").await;
    board
        .post("/new-message", "title=t&content=c", Some(&cookie))
        .await;
    let id = board.state.db.list_messages().unwrap()[0].id;

    for path in [
        format!("/delete-message/{id}"),
        "/delete-message/9999".to_string(),
        "/delete-message/abc".to_string(),
    ] {
        for session in [None, Some(cookie.as_str())] {
            let res = board.post(&path, "", session).await;
            assert_eq!(res.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&res), "/");
            assert_eq!(board.message_count(), 1);
        }
    }
}

#[tokio::test]
async fn admin_delete_removes_exactly_one() {
    let board = Board::new();
    let cookie = board.signup("Root", "root%40example.com").await;
    assert!(board.state.db.set_admin_by_email("root@example.com").unwrap());

    for title in ["one", "two"] {
        board
            .post("/new-message", &format!("title={title}&content=body"), Some(&cookie))
            .await;
    }
    assert_eq!(board.message_count(), 2);

    let home = board.home(Some(&cookie)).await;
    assert!(home.contains("/delete-message/"));

    let id = board.state.db.list_messages().unwrap()[0].id;
    let res = board
        .post(&format!("/delete-message/{id}"), "", Some(&cookie))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(board.message_count(), 1);

    for path in [format!("/delete-message/{id}"), "/delete-message/9999".to_string()] {
        let res = board.post(&path, "", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/");
        assert_eq!(board.message_count(), 1);
    }
}
