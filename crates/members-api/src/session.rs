use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use members_types::api::SessionClaims;

use crate::config::Config;

pub const SESSION_COOKIE: &str = "members_session";

pub fn create_token(secret: &str, user_id: i64, days: i64) -> anyhow::Result<String> {
    let claims = SessionClaims {
        sub: user_id,
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Returns the user id for a token signed with `secret` that has not expired.
pub fn verify_token(secret: &str, token: &str) -> Option<i64> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims.sub)
}

/// Signed session cookie binding the browser to `user_id`.
pub fn session_cookie(config: &Config, user_id: i64) -> anyhow::Result<Cookie<'static>> {
    let token = create_token(&config.session_secret, user_id, config.session_days)?;

    Ok(Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(!config.dev_mode)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(config.session_days))
        .build())
}

/// Cookie to hand to `CookieJar::remove`. Path must match the issued cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let token = create_token("s3cret", 42, 1).unwrap();
        assert_eq!(verify_token("s3cret", &token), Some(42));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = create_token("s3cret", 42, 1).unwrap();
        assert_eq!(verify_token("other", &token), None);
        assert_eq!(verify_token("s3cret", "not-a-jwt"), None);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_token("s3cret", 42, 1).unwrap();
        let forged = create_token("s3cret", 1, 1).unwrap();

        // Splice the payload of one token onto the signature of another.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);
        assert_eq!(verify_token("s3cret", &spliced), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token("s3cret", 42, -2).unwrap();
        assert_eq!(verify_token("s3cret", &token), None);
    }

    #[test]
    fn cookie_attributes() {
        let mut config = Config::development();
        let cookie = session_cookie(&config, 7).unwrap();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(verify_token(&config.session_secret, cookie.value()), Some(7));

        config.dev_mode = false;
        assert_eq!(session_cookie(&config, 7).unwrap().secure(), Some(true));
    }
}
