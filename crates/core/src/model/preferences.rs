use chrono::{DateTime, Utc};

use crate::model::user::UserSession;

/// Locally persisted player preferences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preferences {
    sound_enabled: bool,
}

impl Preferences {
    /// Rehydrate preferences from storage.
    #[must_use]
    pub fn from_persisted(sound_enabled: bool) -> Self {
        Self { sound_enabled }
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn with_sound_enabled(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

/// Bearer token and the user it was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: UserSession,
    /// When the token was issued to this client.
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_defaults_on() {
        assert!(Preferences::default().sound_enabled());
        assert!(!Preferences::from_persisted(false).sound_enabled());
        assert_eq!(
            Preferences::default().with_sound_enabled(false),
            Preferences::from_persisted(false)
        );
    }
}
