use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Format tag written into every backup envelope.
pub const BACKUP_VERSION: &str = "1.0.0";

/// Practice counters. Only ever grow through [`UserStats::record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_sessions: u64,
    pub total_calls: u64,
    pub successful_sequences: u64,
    pub failed_sequences: u64,
}

impl UserStats {
    /// Adds one practice session worth of counters.
    pub fn record(&mut self, session: &PracticeSession) {
        self.total_sessions = self.total_sessions.saturating_add(1);
        self.total_calls = self.total_calls.saturating_add(session.calls);
        self.successful_sequences = self.successful_sequences.saturating_add(session.successful);
        self.failed_sequences = self.failed_sequences.saturating_add(session.failed);
    }

    /// Share of successful sequences, `None` before any sequence was danced.
    pub fn success_rate(&self) -> Option<f64> {
        if self.successful_sequences == 0 && self.failed_sequences == 0 {
            return None;
        }
        let successful = self.successful_sequences as f64;
        Some(successful / (successful + self.failed_sequences as f64))
    }
}

/// Counters gathered during one practice session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PracticeSession {
    pub calls: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Optional display flags. A missing flag means "use the default", never `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_play_animations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_flow_hints: Option<bool>,
}

impl UserPreferences {
    pub const DEFAULT_AUTO_PLAY_ANIMATIONS: bool = true;
    pub const DEFAULT_SHOW_FLOW_HINTS: bool = true;

    pub fn auto_play_animations(&self) -> bool {
        self.auto_play_animations
            .unwrap_or(Self::DEFAULT_AUTO_PLAY_ANIMATIONS)
    }

    pub fn show_flow_hints(&self) -> bool {
        self.show_flow_hints
            .unwrap_or(Self::DEFAULT_SHOW_FLOW_HINTS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub stats: UserStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
}

impl UserProfile {
    /// Builds a fresh profile. The name must already have passed
    /// [`crate::schema::validate_display_name`].
    pub fn new(name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: now.timestamp_millis(),
            stats: UserStats::default(),
            preferences: None,
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }

    /// Preferences with defaults filled in for missing flags.
    pub fn effective_preferences(&self) -> UserPreferences {
        let prefs = self.preferences.unwrap_or_default();
        UserPreferences {
            auto_play_animations: Some(prefs.auto_play_animations()),
            show_flow_hints: Some(prefs.show_flow_hints()),
        }
    }
}

/// Export-side envelope. `user` is whatever JSON sits in the store, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEnvelope {
    pub version: String,
    pub timestamp: i64,
    pub user: Option<Value>,
}

impl BackupEnvelope {
    pub fn new(user: Option<Value>, now: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            timestamp: now.timestamp_millis(),
            user,
        }
    }
}

/// Import-side envelope, produced only by [`crate::schema::validate_envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedEnvelope {
    pub version: String,
    pub timestamp: i64,
    pub user: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_rate_with_saturated_counters() {
        let stats = UserStats {
            successful_sequences: u64::MAX,
            failed_sequences: 1,
            ..Default::default()
        };
        let rate = stats.success_rate().unwrap();
        assert!(rate > 0.99 && rate <= 1.0);

        let stats = UserStats {
            successful_sequences: 1,
            failed_sequences: u64::MAX,
            ..Default::default()
        };
        assert!(stats.success_rate().unwrap() < 0.01);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile::new("Alice".into(), Utc::now());
        let value = serde_json::to_value(&profile).unwrap();

        assert!(value.get("createdAt").is_some());
        assert!(value["stats"].get("totalSessions").is_some());
        assert!(value["stats"].get("successfulSequences").is_some());
        assert!(value.get("preferences").is_none());
    }

    #[test]
    fn test_envelope_serializes_missing_user_as_null() {
        let envelope = BackupEnvelope::new(None, Utc::now());
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["version"], json!("1.0.0"));
        assert_eq!(value["user"], Value::Null);
    }

    #[test]
    fn test_record_accumulates_and_counts_sessions() {
        let mut stats = UserStats::default();
        stats.record(&PracticeSession {
            calls: 40,
            successful: 3,
            failed: 1,
        });
        stats.record(&PracticeSession {
            calls: 10,
            successful: 1,
            failed: 0,
        });

        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_calls, 50);
        assert_eq!(stats.successful_sequences, 4);
        assert_eq!(stats.failed_sequences, 1);
        assert_eq!(stats.success_rate(), Some(0.8));
    }

    #[test]
    fn test_record_saturates() {
        let mut stats = UserStats {
            total_calls: u64::MAX,
            ..Default::default()
        };
        stats.record(&PracticeSession {
            calls: 5,
            ..Default::default()
        });
        assert_eq!(stats.total_calls, u64::MAX);
    }

    #[test]
    fn test_missing_preferences_mean_defaults() {
        let profile = UserProfile::new("Alice".into(), Utc::now());
        let prefs = profile.effective_preferences();
        assert_eq!(prefs.auto_play_animations, Some(true));
        assert_eq!(prefs.show_flow_hints, Some(true));

        let partial = UserPreferences {
            auto_play_animations: Some(false),
            show_flow_hints: None,
        };
        assert!(!partial.auto_play_animations());
        assert!(partial.show_flow_hints());
    }
}
