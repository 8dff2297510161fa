use thiserror::Error;

use members_types::api::{LoginForm, NewMessageForm, SignupForm};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 5000;

/// Shown when a form body cannot be decoded at all.
pub const MALFORMED_FORM: &str = "Invalid form submission";

/// Form problems shown back to the user verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Passwords don't match")]
    PasswordMismatch,
}

#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewMessage {
    pub title: String,
    pub content: String,
}

pub fn validate_signup(form: SignupForm) -> Result<NewUser, ValidationError> {
    let first_name = required("First name", &form.first_name)?;
    let last_name = required("Last name", &form.last_name)?;
    let email = email(&form.email)?;
    min_len("Password", &form.password, MIN_PASSWORD_LEN)?;
    min_len("Password confirmation", &form.confirm_password, MIN_PASSWORD_LEN)?;

    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(NewUser {
        first_name,
        last_name,
        email,
        password: form.password,
    })
}

pub fn validate_login(form: LoginForm) -> Result<Credentials, ValidationError> {
    Ok(Credentials {
        email: email(&form.email)?,
        password: form.password,
    })
}

pub fn validate_message(form: NewMessageForm) -> Result<NewMessage, ValidationError> {
    let title = required("Title", &form.title)?;
    let content = required("Content", &form.content)?;
    max_len("Title", &title, MAX_TITLE_LEN)?;
    max_len("Content", &content, MAX_CONTENT_LEN)?;

    Ok(NewMessage { title, content })
}

/// `local@domain.tld`: one `@`, no whitespace, non-empty dot-separated domain labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

fn email(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if !is_valid_email(value) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(value.to_string())
}

fn min_len(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
