//! # Schema Validation
//!
//! Every piece of untyped JSON that crosses a trust boundary (a stored value
//! being read back, a backup file being imported) passes through one of the
//! validators in this module before it is treated as domain data.
//!
//! Validators are pure: they never touch storage, never log, never panic.
//! They return either the typed value or a [`SchemaRejection`] listing every
//! violation found, each tagged with the JSON path it applies to.
//!
//! There are two independent entry points:
//!
//! - [`validate_profile`]: a bare [`UserProfile`]
//! - [`validate_envelope`]: a backup envelope with an optional nested profile
//!
//! Import runs both, in that order: the envelope first, then the nested
//! profile again on its own. Both share the field rules below, so a change
//! to the profile shape lands in both places at once.
//!
//! The display-name rules used when a human types a name live in
//! [`validate_display_name`]. They are stricter than the stored-data schema:
//! surrounding whitespace is a caller-level rejection, not a schema one.

use crate::model::{UserProfile, ValidatedEnvelope};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

pub const NAME_MAX_CHARS: usize = 20;

const STATS_FIELDS: [&str; 4] = [
    "totalSessions",
    "totalCalls",
    "successfulSequences",
    "failedSequences",
];

const PREFERENCE_FIELDS: [&str; 2] = ["autoPlayAnimations", "showFlowHints"];

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted JSON path, empty for the document root.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Why a value was refused. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRejection {
    pub violations: Vec<Violation>,
}

impl SchemaRejection {
    fn single(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                path: path.into(),
                reason: reason.into(),
            }],
        }
    }

    /// True if any violation is reported at exactly `path`.
    pub fn has_violation_at(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

impl fmt::Display for SchemaRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for SchemaRejection {}

/// A declarative shape that untyped JSON can be checked against.
pub trait Schema {
    type Output;

    /// Short label used in diagnostics.
    fn name(&self) -> &'static str;

    fn validate(&self, raw: &Value) -> Result<Self::Output, SchemaRejection>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileSchema;

impl Schema for ProfileSchema {
    type Output = UserProfile;

    fn name(&self) -> &'static str {
        "user profile"
    }

    fn validate(&self, raw: &Value) -> Result<UserProfile, SchemaRejection> {
        validate_profile(raw)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeSchema;

impl Schema for EnvelopeSchema {
    type Output = ValidatedEnvelope;

    fn name(&self) -> &'static str {
        "backup envelope"
    }

    fn validate(&self, raw: &Value) -> Result<ValidatedEnvelope, SchemaRejection> {
        validate_envelope(raw)
    }
}

/// Validates a stored or imported user profile.
pub fn validate_profile(raw: &Value) -> Result<UserProfile, SchemaRejection> {
    let mut violations = Vec::new();
    check_profile(raw, "", &mut violations);
    if !violations.is_empty() {
        return Err(SchemaRejection { violations });
    }
    serde_json::from_value(raw.clone()).map_err(|e| SchemaRejection::single("", e.to_string()))
}

/// Validates a backup envelope, including the nested profile when present.
pub fn validate_envelope(raw: &Value) -> Result<ValidatedEnvelope, SchemaRejection> {
    let Some(obj) = raw.as_object() else {
        return Err(SchemaRejection::single("", "expected a JSON object"));
    };

    let mut violations = Vec::new();

    match obj.get("version") {
        Some(Value::String(v)) if !v.is_empty() => {}
        Some(Value::String(_)) => push(&mut violations, "version", "must not be empty"),
        Some(_) => push(&mut violations, "version", "must be a string"),
        None => push(&mut violations, "version", "is required"),
    }

    match obj.get("timestamp") {
        Some(v) if v.as_i64().is_some_and(|ms| ms >= 0) => {}
        Some(_) => push(&mut violations, "timestamp", "must be a non-negative integer"),
        None => push(&mut violations, "timestamp", "is required"),
    }

    match obj.get("user") {
        Some(Value::Null) => {}
        Some(user) => check_profile(user, "user", &mut violations),
        None => push(&mut violations, "user", "is required (use null for no profile)"),
    }

    if !violations.is_empty() {
        return Err(SchemaRejection { violations });
    }

    let user = match obj.get("user") {
        Some(Value::Null) | None => None,
        Some(user) => Some(
            serde_json::from_value(user.clone())
                .map_err(|e| SchemaRejection::single("user", e.to_string()))?,
        ),
    };

    Ok(ValidatedEnvelope {
        version: obj["version"].as_str().unwrap_or_default().to_string(),
        timestamp: obj["timestamp"].as_i64().unwrap_or_default(),
        user,
    })
}

fn check_profile(raw: &Value, prefix: &str, violations: &mut Vec<Violation>) {
    let Some(obj) = raw.as_object() else {
        push(violations, prefix, "expected a JSON object");
        return;
    };

    match obj.get("id") {
        Some(Value::String(id)) if is_hyphenated_uuid(id) => {}
        Some(Value::String(_)) => push(violations, &join(prefix, "id"), "must be a valid UUID"),
        Some(_) => push(violations, &join(prefix, "id"), "must be a string"),
        None => push(violations, &join(prefix, "id"), "is required"),
    }

    match obj.get("name") {
        Some(Value::String(name)) => {
            if let Err(e) = check_name_shape(name) {
                push(violations, &join(prefix, "name"), &e.to_string());
            }
        }
        Some(_) => push(violations, &join(prefix, "name"), "must be a string"),
        None => push(violations, &join(prefix, "name"), "is required"),
    }

    match obj.get("createdAt") {
        Some(v) if v.as_i64().is_some_and(|ms| ms > 0) => {}
        Some(_) => push(
            violations,
            &join(prefix, "createdAt"),
            "must be a positive integer",
        ),
        None => push(violations, &join(prefix, "createdAt"), "is required"),
    }

    let stats_path = join(prefix, "stats");
    match obj.get("stats") {
        Some(Value::Object(stats)) => check_stats(stats, &stats_path, violations),
        Some(_) => push(violations, &stats_path, "expected a JSON object"),
        None => push(violations, &stats_path, "is required"),
    }

    let prefs_path = join(prefix, "preferences");
    match obj.get("preferences") {
        None => {}
        Some(Value::Object(prefs)) => check_preferences(prefs, &prefs_path, violations),
        Some(_) => push(violations, &prefs_path, "expected a JSON object"),
    }
}

fn check_stats(stats: &Map<String, Value>, prefix: &str, violations: &mut Vec<Violation>) {
    for field in STATS_FIELDS {
        match stats.get(field) {
            Some(v) if v.as_u64().is_some() => {}
            Some(_) => push(
                violations,
                &join(prefix, field),
                "must be a non-negative integer",
            ),
            None => push(violations, &join(prefix, field), "is required"),
        }
    }
}

fn check_preferences(prefs: &Map<String, Value>, prefix: &str, violations: &mut Vec<Violation>) {
    for (key, value) in prefs {
        if !PREFERENCE_FIELDS.contains(&key.as_str()) {
            push(violations, &join(prefix, key), "is not a known preference");
        } else if !value.is_boolean() {
            push(violations, &join(prefix, key), "must be a boolean");
        }
    }
}

/// Hyphenated 8-4-4-4-12 form only; braced, URN and simple forms are refused.
fn is_hyphenated_uuid(s: &str) -> bool {
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn push(violations: &mut Vec<Violation>, path: &str, reason: &str) {
    violations.push(Violation {
        path: path.to_string(),
        reason: reason.to_string(),
    });
}

/// Error type for display-name failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong(usize),
    InvalidCharacter(char),
    /// Leading or trailing whitespace. Only raised by [`validate_display_name`].
    SurroundingWhitespace,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "name cannot be empty"),
            NameError::TooLong(len) => write!(
                f,
                "name is {} characters long (at most {} allowed)",
                len, NAME_MAX_CHARS
            ),
            NameError::InvalidCharacter(ch) => write!(
                f,
                "name contains invalid character '{}' (only letters, digits, spaces, hyphen and underscore allowed)",
                ch
            ),
            NameError::SurroundingWhitespace => {
                write!(f, "name cannot start or end with whitespace")
            }
        }
    }
}

impl std::error::Error for NameError {}

fn is_valid_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == ' ' || ch == '-' || ch == '_'
}

/// Length and character-set rules shared by every stored profile.
fn check_name_shape(name: &str) -> Result<(), NameError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(NameError::Empty);
    }
    if len > NAME_MAX_CHARS {
        return Err(NameError::TooLong(len));
    }
    if let Some(ch) = name.chars().find(|c| !is_valid_name_char(*c)) {
        return Err(NameError::InvalidCharacter(ch));
    }
    Ok(())
}

/// Validates a name typed by a human before it becomes part of a profile.
///
/// # Examples
/// ```
/// use sdcaller::schema::{validate_display_name, NameError};
///
/// assert!(validate_display_name("Bob Smith-99_").is_ok());
/// assert_eq!(validate_display_name("Bob!"), Err(NameError::InvalidCharacter('!')));
/// assert_eq!(validate_display_name(" Bob"), Err(NameError::SurroundingWhitespace));
/// ```
pub fn validate_display_name(name: &str) -> Result<String, NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.trim() != name {
        return Err(NameError::SurroundingWhitespace);
    }
    check_name_shape(name)?;
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_profile_json() -> Value {
        json!({
            "id": "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b",
            "name": "Alice",
            "createdAt": 1_700_000_000_000i64,
            "stats": {
                "totalSessions": 0,
                "totalCalls": 0,
                "successfulSequences": 0,
                "failedSequences": 0
            }
        })
    }

    #[test]
    fn test_valid_profile_passes() {
        let profile = validate_profile(&valid_profile_json()).unwrap();
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.created_at, 1_700_000_000_000);
        assert!(profile.preferences.is_none());
    }

    #[test]
    fn test_serialized_profile_validates_to_itself() {
        let mut profile = validate_profile(&valid_profile_json()).unwrap();
        profile.stats.total_calls = 312;
        profile.preferences = Some(crate::model::UserPreferences {
            auto_play_animations: Some(false),
            show_flow_hints: None,
        });

        let raw = serde_json::to_value(&profile).unwrap();
        assert_eq!(validate_profile(&raw).unwrap(), profile);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = validate_profile(&json!("Alice")).unwrap_err();
        assert!(err.has_violation_at(""));
    }

    #[test]
    fn test_non_uuid_id_rejected() {
        let mut raw = valid_profile_json();
        raw["id"] = json!("user-1");
        let err = validate_profile(&raw).unwrap_err();
        assert!(err.has_violation_at("id"));
    }

    #[test]
    fn test_simple_form_uuid_rejected() {
        let mut raw = valid_profile_json();
        raw["id"] = json!("3f2b8c1e9a4d4e6f8b7a1c2d3e4f5a6b");
        assert!(validate_profile(&raw).is_err());
    }

    #[test]
    fn test_name_length_and_charset() {
        let mut raw = valid_profile_json();
        raw["name"] = json!("a".repeat(21));
        assert!(validate_profile(&raw).unwrap_err().has_violation_at("name"));

        raw["name"] = json!("a".repeat(20));
        assert!(validate_profile(&raw).is_ok());

        raw["name"] = json!("");
        assert!(validate_profile(&raw).unwrap_err().has_violation_at("name"));

        raw["name"] = json!("Bob!");
        assert!(validate_profile(&raw).unwrap_err().has_violation_at("name"));
    }

    #[test]
    fn test_schema_does_not_trim_check() {
        let mut raw = valid_profile_json();
        raw["name"] = json!(" Bob");
        assert!(validate_profile(&raw).is_ok());
    }

    #[test]
    fn test_created_at_must_be_positive_integer() {
        let mut raw = valid_profile_json();
        for bad in [json!(0), json!(-5), json!(1.5), json!("1700000000000")] {
            raw["createdAt"] = bad;
            assert!(validate_profile(&raw)
                .unwrap_err()
                .has_violation_at("createdAt"));
        }
    }

    #[test]
    fn test_negative_stat_rejected() {
        let mut raw = valid_profile_json();
        raw["stats"]["totalCalls"] = json!(-1);
        let err = validate_profile(&raw).unwrap_err();
        assert!(err.has_violation_at("stats.totalCalls"));
    }

    #[test]
    fn test_missing_stat_rejected() {
        let mut raw = valid_profile_json();
        raw["stats"]
            .as_object_mut()
            .unwrap()
            .remove("failedSequences");
        let err = validate_profile(&raw).unwrap_err();
        assert!(err.has_violation_at("stats.failedSequences"));
    }

    #[test]
    fn test_all_violations_collected() {
        let raw = json!({
            "id": 7,
            "name": "Bob!",
            "createdAt": -1,
            "stats": {"totalSessions": 0, "totalCalls": -3, "successfulSequences": 0, "failedSequences": 0}
        });
        let err = validate_profile(&raw).unwrap_err();
        assert_eq!(err.violations.len(), 4);
    }

    #[test]
    fn test_preferences_rules() {
        let mut raw = valid_profile_json();
        raw["preferences"] = json!({"showFlowHints": false});
        let profile = validate_profile(&raw).unwrap();
        let prefs = profile.preferences.unwrap();
        assert_eq!(prefs.show_flow_hints, Some(false));
        assert_eq!(prefs.auto_play_animations, None);

        raw["preferences"] = json!({});
        assert!(validate_profile(&raw).is_ok());

        raw["preferences"] = json!({"darkMode": true});
        assert!(validate_profile(&raw)
            .unwrap_err()
            .has_violation_at("preferences.darkMode"));

        raw["preferences"] = json!({"autoPlayAnimations": "yes"});
        assert!(validate_profile(&raw)
            .unwrap_err()
            .has_violation_at("preferences.autoPlayAnimations"));

        raw["preferences"] = json!(null);
        assert!(validate_profile(&raw)
            .unwrap_err()
            .has_violation_at("preferences"));
    }

    #[test]
    fn test_unknown_top_level_fields_are_dropped() {
        let mut raw = valid_profile_json();
        raw["legacyField"] = json!(1);
        let profile = validate_profile(&raw).unwrap();
        let back = serde_json::to_value(&profile).unwrap();
        assert!(back.get("legacyField").is_none());
    }

    #[test]
    fn test_envelope_with_user() {
        let raw = json!({"version": "1.0.0", "timestamp": 1_700_000_000_500i64, "user": valid_profile_json()});
        let envelope = validate_envelope(&raw).unwrap();
        assert_eq!(envelope.version, "1.0.0");
        assert_eq!(envelope.timestamp, 1_700_000_000_500);
        assert_eq!(envelope.user.unwrap().name, "Alice");
    }

    #[test]
    fn test_envelope_with_null_user() {
        let raw = json!({"version": "1.0.0", "timestamp": 1, "user": null});
        assert_eq!(validate_envelope(&raw).unwrap().user, None);
    }

    #[test]
    fn test_envelope_missing_fields_rejected() {
        let err = validate_envelope(&json!({"version": "1.0.0"})).unwrap_err();
        assert!(err.has_violation_at("timestamp"));
        assert!(err.has_violation_at("user"));
        assert!(!err.has_violation_at("version"));
    }

    #[test]
    fn test_envelope_timestamp_rules() {
        for bad in [json!(-5), json!(1.5), json!("1700000000000")] {
            let raw = json!({"version": "1.0.0", "timestamp": bad, "user": null});
            let err = validate_envelope(&raw).unwrap_err();
            assert!(err.has_violation_at("timestamp"), "accepted {}", raw);
        }

        let raw = json!({"version": "1.0.0", "timestamp": 0, "user": null});
        assert_eq!(validate_envelope(&raw).unwrap().timestamp, 0);
    }

    #[test]
    fn test_envelope_nested_violation_paths() {
        let mut user = valid_profile_json();
        user["stats"]["totalCalls"] = json!(-1);
        let raw = json!({"version": "1.0.0", "timestamp": 1, "user": user});
        let err = validate_envelope(&raw).unwrap_err();
        assert!(err.has_violation_at("user.stats.totalCalls"));
    }

    #[test]
    fn test_schema_trait_dispatch() {
        assert_eq!(ProfileSchema.name(), "user profile");
        assert!(ProfileSchema.validate(&valid_profile_json()).is_ok());
        assert!(EnvelopeSchema.validate(&valid_profile_json()).is_err());
    }

    #[test]
    fn test_display_name_rules() {
        assert_eq!(
            validate_display_name("Bob Smith-99_"),
            Ok("Bob Smith-99_".to_string())
        );
        assert_eq!(
            validate_display_name("Bob!"),
            Err(NameError::InvalidCharacter('!'))
        );
        assert_eq!(
            validate_display_name(&"a".repeat(21)),
            Err(NameError::TooLong(21))
        );
        assert_eq!(
            validate_display_name(" Bob"),
            Err(NameError::SurroundingWhitespace)
        );
        assert_eq!(
            validate_display_name("Bob "),
            Err(NameError::SurroundingWhitespace)
        );
        assert_eq!(validate_display_name(""), Err(NameError::Empty));
        assert_eq!(
            validate_display_name("   "),
            Err(NameError::SurroundingWhitespace)
        );
    }

    #[test]
    fn test_rejection_display_lists_paths() {
        let err = validate_envelope(&json!({"version": "1.0.0"})).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("timestamp: is required"));
        assert!(text.contains("user: is required"));
    }
}
