use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// Role derived from the admin/moderator flags. Admin wins over moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    #[must_use]
    pub fn from_flags(is_admin: bool, is_moder: bool) -> Self {
        if is_admin {
            Role::Admin
        } else if is_moder {
            Role::Moderator
        } else {
            Role::User
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }
}

/// The signed-in user, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_moder: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl UserSession {
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_admin, self.is_moder)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub fn is_moderator(&self) -> bool {
        self.is_moder
    }

    /// Moderator screens are open to both admins and moderators.
    #[must_use]
    pub fn can_moderate(&self) -> bool {
        self.is_active && (self.is_admin || self.is_moder)
    }
}

/// A user row in the admin users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_moder: bool,
    #[serde(deserialize_with = "crate::model::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_admin, self.is_moder)
    }
}

/// Which role flag an admin is changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFlag {
    Admin,
    Moderator,
}

/// Body of a role change request; only the changed flag is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_moder: Option<bool>,
}

impl RoleUpdate {
    #[must_use]
    pub fn set(flag: RoleFlag, value: bool) -> Self {
        match flag {
            RoleFlag::Admin => Self {
                is_admin: Some(value),
                is_moder: None,
            },
            RoleFlag::Moderator => Self {
                is_admin: None,
                is_moder: Some(value),
            },
        }
    }

    pub fn apply_to(&self, user: &mut UserRecord) {
        if let Some(value) = self.is_admin {
            user.is_admin = value;
        }
        if let Some(value) = self.is_moder {
            user.is_moder = value;
        }
    }
}

/// Role filter of the admin users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Admin,
    /// Moderators that are not admins.
    Moderator,
    /// Neither admin nor moderator.
    User,
}

/// Search + role filter over the users table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    pub search: String,
    pub role: RoleFilter,
}

impl UserFilter {
    #[must_use]
    pub fn matches(&self, user: &UserRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || user.username.to_lowercase().contains(&needle)
            || user.email.to_lowercase().contains(&needle);

        let matches_role = match self.role {
            RoleFilter::All => true,
            RoleFilter::Admin => user.is_admin,
            RoleFilter::Moderator => user.is_moder && !user.is_admin,
            RoleFilter::User => !user.is_admin && !user.is_moder,
        };

        matches_search && matches_role
    }

    pub fn apply<'a>(&'a self, users: &'a [UserRecord]) -> impl Iterator<Item = &'a UserRecord> {
        users.iter().filter(move |user| self.matches(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn user(id: u64, name: &str, is_admin: bool, is_moder: bool) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            is_active: true,
            is_admin,
            is_moder,
            created_at: fixed_now(),
        }
    }

    #[test]
    fn role_prefers_admin() {
        assert_eq!(Role::from_flags(true, true), Role::Admin);
        assert_eq!(Role::from_flags(false, true), Role::Moderator);
        assert_eq!(Role::from_flags(false, false), Role::User);
    }

    #[test]
    fn filter_by_role_and_search() {
        let users = vec![
            user(1, "nino", true, true),
            user(2, "luka", false, true),
            user(3, "ana", false, false),
        ];

        let moderators = UserFilter {
            search: String::new(),
            role: RoleFilter::Moderator,
        };
        let names: Vec<_> = moderators.apply(&users).map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["luka"]);

        let search = UserFilter {
            search: "AN".to_string(),
            role: RoleFilter::All,
        };
        let names: Vec<_> = search.apply(&users).map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["ana"]);
    }

    #[test]
    fn role_update_serializes_only_changed_flag() {
        let body = RoleUpdate::set(RoleFlag::Moderator, true);
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"is_moder":true}"#);

        let mut record = user(4, "gio", false, false);
        body.apply_to(&mut record);
        assert!(record.is_moder);
        assert!(!record.is_admin);
    }

    #[test]
    fn session_without_flags_is_plain_user() {
        let session: UserSession = serde_json::from_str(r#"{"username": "ana"}"#).unwrap();
        assert_eq!(session.role(), Role::User);
        assert!(session.is_active);
        assert!(!session.can_moderate());
    }
}
