use crate::models::{MessageRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, is_member, is_admin";

impl Database {
    // -- Users --

    /// Inserts a user with both role flags cleared and returns the new id.
    /// A duplicate email fails with a constraint violation.
    pub fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (first_name, last_name, email, password) VALUES (?1, ?2, ?3, ?4)",
                (first_name, last_name, email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", &email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id))
    }

    /// Idempotent: marking an existing member again changes nothing.
    pub fn set_member(&self, user_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET is_member = 1 WHERE id = ?1", [user_id])?;
            Ok(())
        })
    }

    /// Returns false when no account uses `email`.
    pub fn set_admin_by_email(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE users SET is_admin = 1 WHERE email = ?1", [email])?;
            Ok(changed > 0)
        })
    }

    pub fn count_users_with_email(&self, email: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM users WHERE email = ?1", [email], |row| {
                row.get(0)
            })?;
            Ok(n)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, title: &str, content: &str, user_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (title, content, user_id) VALUES (?1, ?2, ?3)",
                (title, content, user_id),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All messages, newest first.
    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(query_messages)
    }

    /// Returns whether a row was removed. Deleting a missing id is not an error.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    pub fn count_messages(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(n)
        })
    }
}

fn query_user(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::types::ToSql,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        password: row.get(4)?,
        is_member: row.get(5)?,
        is_admin: row.get(6)?,
    })
}

fn query_messages(conn: &Connection) -> Result<Vec<MessageRow>> {
    // JOIN users to fetch the author name in the same query
    let mut stmt = conn.prepare(
        "SELECT m.id, m.title, m.content, m.user_id, u.first_name || ' ' || u.last_name, m.created_at
         FROM messages m
         LEFT JOIN users u ON m.user_id = u.id
         ORDER BY m.created_at DESC, m.id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                user_id: row.get(3)?,
                author_name: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
