//! User profile persistence.
//!
//! Preferences persist as a single JSON `prefs` document per user. The
//! profile shape changes with the UI; a schema column per toggle would turn
//! every preference into a migration.

use rusqlite::{params, OptionalExtension};

use super::{CaseDb, DbError};
use crate::types::UserProfile;

impl CaseDb {
    pub fn upsert_profile(&self, profile: &UserProfile, updated_at: &str) -> Result<(), DbError> {
        let prefs = serde_json::to_string(profile)?;
        self.conn_ref().execute(
            "INSERT INTO user_profiles (user_id, prefs, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                prefs = excluded.prefs,
                updated_at = excluded.updated_at",
            params![profile.user_id, prefs, updated_at],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DbError> {
        let prefs = self
            .conn_ref()
            .query_row(
                "SELECT prefs FROM user_profiles WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match prefs {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use crate::types::{DeadlineType, QuietHours, UserProfile};

    #[test]
    fn upsert_and_get_roundtrip() {
        let db = test_db();
        let mut profile = UserProfile {
            user_id: "u1".into(),
            calendar_sync_enabled: true,
            quiet_hours: Some(QuietHours {
                start_hour: 22,
                end_hour: 7,
            }),
            ..Default::default()
        };
        profile
            .notification_type_toggles
            .insert(DeadlineType::FilingWindowOpen, false);

        db.upsert_profile(&profile, "2024-06-01T00:00:00Z")
            .expect("upsert");

        let stored = db.get_profile("u1").expect("get").expect("exists");
        assert!(stored.calendar_sync_enabled);
        assert_eq!(
            stored.quiet_hours,
            Some(QuietHours {
                start_hour: 22,
                end_hour: 7
            })
        );
        assert!(!stored.notification_enabled_for(DeadlineType::FilingWindowOpen));
        assert!(stored.notification_enabled_for(DeadlineType::RfiResponse));
    }

    #[test]
    fn upsert_replaces_prefs() {
        let db = test_db();
        let mut profile = UserProfile {
            user_id: "u1".into(),
            ..Default::default()
        };
        db.upsert_profile(&profile, "2024-06-01T00:00:00Z")
            .expect("first");

        profile.reminder_lead_days = 14;
        db.upsert_profile(&profile, "2024-06-02T00:00:00Z")
            .expect("second");

        let stored = db.get_profile("u1").expect("get").expect("exists");
        assert_eq!(stored.reminder_lead_days, 14);
    }

    #[test]
    fn missing_profile_is_none() {
        let db = test_db();
        assert!(db.get_profile("nobody").expect("get").is_none());
    }
}
