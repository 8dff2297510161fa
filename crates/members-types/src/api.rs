use serde::{Deserialize, Serialize};

// -- Session --

/// Claims carried by the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: i64,
    pub exp: usize,
}

// -- Forms --
//
// Every field defaults to empty so that a missing field reaches validation
// instead of failing extraction.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinClubForm {
    pub secret_code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewMessageForm {
    pub title: String,
    pub content: String,
}
