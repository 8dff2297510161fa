use chrono::{DateTime, Utc};

/// A registered account as seen by handlers. The password hash never leaves
/// the persistence layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_member: bool,
    pub is_admin: bool,
}

impl User {
    /// Members unlock author and timestamp metadata on the listing.
    pub fn can_see_authors(&self) -> bool {
        self.is_member
    }

    pub fn can_delete_messages(&self) -> bool {
        self.is_admin
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}
