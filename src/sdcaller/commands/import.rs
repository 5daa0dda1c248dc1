//! Backup import.
//!
//! Imported data is checked twice: the whole envelope first, then the nested
//! profile on its own right before it is written. An import either replaces
//! the stored profile completely or leaves it exactly as it was.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SdCallerError};
use crate::model::{UserProfile, ValidatedEnvelope};
use crate::schema::{self, ProfileSchema, SchemaRejection};
use crate::store::{KvBackend, LocalStore, USER_KEY};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// The single gate for imported data.
pub fn validate_envelope(raw: &Value) -> std::result::Result<ValidatedEnvelope, SchemaRejection> {
    schema::validate_envelope(raw)
}

/// Validate `raw` and apply it to the store.
///
/// Returns `false`, with the store untouched, when the envelope or its
/// profile is invalid or the write fails.
pub fn import_and_apply<B: KvBackend>(store: &LocalStore<B>, raw: &Value) -> bool {
    if let Err(rejection) = validate_envelope(raw) {
        warn!(error = %rejection, "rejected backup envelope");
        return false;
    }

    let applied = match raw.get("user") {
        Some(Value::Null) | None => store.try_remove(USER_KEY),
        Some(user) => match schema::validate_profile(user) {
            Ok(profile) => store.try_save(USER_KEY, &profile),
            Err(rejection) => {
                warn!(error = %rejection, "rejected profile inside backup envelope");
                return false;
            }
        },
    };

    match applied {
        Ok(()) => {
            info!("backup imported");
            true
        }
        Err(e) => {
            warn!(error = %e, "failed to apply backup");
            false
        }
    }
}

/// Read a backup file and parse it as JSON, keeping the failure reason.
pub fn read_backup_file(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(SdCallerError::Io)?;
    serde_json::from_str(&text).map_err(SdCallerError::Serialization)
}

/// Read, parse and validate a backup file. Any failure is logged and `None`.
pub fn load_envelope_from_file(path: &Path) -> Option<ValidatedEnvelope> {
    let raw = match read_backup_file(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read backup file");
            return None;
        }
    };
    match validate_envelope(&raw) {
        Ok(envelope) => Some(envelope),
        Err(rejection) => {
            warn!(path = %path.display(), error = %rejection, "invalid backup file");
            None
        }
    }
}

/// What an import would do, for a confirmation prompt.
#[derive(Debug)]
pub struct ImportPreview {
    pub envelope: ValidatedEnvelope,
    /// The profile that would be overwritten or removed.
    pub replaces: Option<UserProfile>,
}

impl ImportPreview {
    /// True when applying would discard a stored profile.
    pub fn is_destructive(&self) -> bool {
        match (&self.replaces, &self.envelope.user) {
            (None, _) => false,
            (Some(current), Some(incoming)) => current != incoming,
            (Some(_), None) => true,
        }
    }
}

/// Validate without applying.
pub fn preview<B: KvBackend>(store: &LocalStore<B>, raw: &Value) -> Result<ImportPreview> {
    let envelope = validate_envelope(raw)?;
    Ok(ImportPreview {
        envelope,
        replaces: store.load(USER_KEY, &ProfileSchema),
    })
}

pub fn run<B: KvBackend>(store: &LocalStore<B>, raw: &Value) -> Result<CmdResult> {
    let envelope = validate_envelope(raw)?;
    if !import_and_apply(store, raw) {
        return Err(SdCallerError::Store(
            "Backup could not be applied; the stored profile was left unchanged".to_string(),
        ));
    }

    let mut result = CmdResult::default();
    match envelope.user {
        Some(profile) => {
            result.add_message(CmdMessage::success(format!(
                "Restored profile for {}",
                profile.name
            )));
            result = result.with_profile(profile);
        }
        None => {
            result.add_message(CmdMessage::success(
                "Backup held no profile; the stored profile was removed.",
            ));
        }
    }
    Ok(result)
}
