//! User display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{NONE, format_datetime, truncate_string};
use crate::client::models::{AccountStatus, Lifecycle, User};

/// User display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct UserDisplay {
    #[tabled(rename = "USER ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "EMAIL")]
    pub email: String,

    /// Organization names, comma-separated
    #[tabled(rename = "ORGANIZATIONS")]
    pub organizations: String,

    /// live or deleted
    #[tabled(rename = "RECORD")]
    pub lifecycle: String,

    /// active, inactive, or `--` when the API does not say
    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "UPDATED")]
    pub updated: String,
}

impl From<&User> for UserDisplay {
    fn from(user: &User) -> Self {
        let organizations = if user.organizations.is_empty() {
            NONE.to_string()
        } else {
            truncate_string(&user.organizations.join(", "), 40)
        };

        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            organizations,
            lifecycle: match user.lifecycle() {
                Lifecycle::Live => "live",
                Lifecycle::SoftDeleted => "deleted",
            }
            .to_string(),
            status: match user.status {
                Some(AccountStatus::Active) => "active",
                Some(AccountStatus::Inactive) => "inactive",
                None => NONE,
            }
            .to_string(),
            updated: format_datetime(user.updated_at.or(user.created_at)),
        }
    }
}

impl From<User> for UserDisplay {
    fn from(user: User) -> Self {
        UserDisplay::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::user;

    #[test]
    fn test_user_display_from_user() {
        let mut u = user("user-123", "Jane Doe", "jane@example.com");
        u.organizations = vec!["Acme".into(), "Globex".into()];
        u.status = Some(AccountStatus::Active);

        let display = UserDisplay::from(&u);

        assert_eq!(display.id, "user-123");
        assert_eq!(display.organizations, "Acme, Globex");
        assert_eq!(display.lifecycle, "live");
        assert_eq!(display.status, "active");
    }

    #[test]
    fn test_soft_deleted_user_without_status() {
        let mut u = user("user-1", "Gone", "gone@example.com");
        u.deleted_at = Some(chrono::Utc::now());

        let display = UserDisplay::from(u);

        assert_eq!(display.lifecycle, "deleted");
        assert_eq!(display.status, "--");
        assert_eq!(display.organizations, "--");
    }
}
