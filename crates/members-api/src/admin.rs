use members_db::Database;
use tracing::{info, warn};

/// Grant admin to each listed account that exists. Returns how many were promoted.
pub fn promote_admins(db: &Database, emails: &[String]) -> anyhow::Result<usize> {
    let mut promoted = 0;
    for email in emails {
        if db.set_admin_by_email(email)? {
            info!("Granted admin to {}", email);
            promoted += 1;
        } else {
            warn!("Admin bootstrap: no account for {}", email);
        }
    }
    Ok(promoted)
}
