//! Database row types, mapped directly from SQLite rows.
//! Distinct from members-types models so the password hash stays here.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use members_types::models::{Message, User};

pub struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_member: bool,
    pub is_admin: bool,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            is_member: self.is_member,
            is_admin: self.is_admin,
        }
    }
}

pub struct MessageRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub author_name: Option<String>,
    pub created_at: String,
}

impl MessageRow {
    pub fn into_message(self) -> Message {
        let created_at = parse_timestamp(&self.created_at).unwrap_or_else(|| {
            warn!("Corrupt created_at '{}' on message {}", self.created_at, self.id);
            DateTime::default()
        });

        Message {
            id: self.id,
            title: self.title,
            content: self.content,
            author_id: self.user_id,
            author_name: self.author_name.unwrap_or_else(|| "unknown".to_string()),
            created_at,
        }
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS[.fff]" without a zone; they are UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
