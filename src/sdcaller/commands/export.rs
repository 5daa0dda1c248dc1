//! Backup export.
//!
//! Export is a tolerant read: whatever JSON sits under the profile key goes
//! into the envelope as-is, even if it no longer matches the current schema.
//! That way an export always succeeds and never loses data the schema does
//! not (yet) understand.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SdCallerError};
use crate::model::BackupEnvelope;
use crate::store::{KvBackend, LocalStore, USER_KEY};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const MAX_NAME_COPIES: u32 = 999;

/// Wrap the raw stored profile (or its absence) in a versioned envelope.
pub fn export_current_state<B: KvBackend>(
    store: &LocalStore<B>,
    now: DateTime<Utc>,
) -> BackupEnvelope {
    BackupEnvelope::new(store.load_raw(USER_KEY), now)
}

/// `<prefix>-backup-2026-10-18T09-05-03.json` for the given epoch milliseconds.
pub fn backup_filename(prefix: &str, timestamp_ms: i64) -> String {
    let at = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default();
    let stamp: String = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
        .chars()
        .take(19)
        .collect();
    format!("{}-backup-{}.json", prefix, stamp)
}

pub fn to_pretty_json(envelope: &BackupEnvelope) -> Result<String> {
    serde_json::to_string_pretty(envelope).map_err(SdCallerError::Serialization)
}

/// Write the envelope as a pretty-printed file in `dir`. Does not touch the store.
///
/// An existing backup is never replaced: a name already taken gets a
/// ` (1)`, ` (2)`, ... suffix before the extension.
pub fn serialize_and_offer_as_file(
    envelope: &BackupEnvelope,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let json = to_pretty_json(envelope)?;
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(SdCallerError::Io)?;
    }

    let filename = backup_filename(prefix, envelope.timestamp);
    let stem = filename.trim_end_matches(".json");
    let mut copy = 0u32;
    loop {
        let path = if copy == 0 {
            dir.join(&filename)
        } else {
            dir.join(format!("{} ({}).json", stem, copy))
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes()).map_err(SdCallerError::Io)?;
                info!(path = %path.display(), "backup written");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && copy < MAX_NAME_COPIES => {
                copy += 1;
            }
            Err(e) => return Err(SdCallerError::Io(e)),
        }
    }
}

pub fn run<B: KvBackend>(
    store: &LocalStore<B>,
    dir: &Path,
    prefix: &str,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let envelope = export_current_state(store, now);
    let path = serialize_and_offer_as_file(&envelope, dir, prefix)?;

    let mut result = CmdResult::default().with_backup_path(path.clone());
    if envelope.user.is_none() {
        result.add_message(CmdMessage::warning(
            "No profile stored; the backup records an empty state.",
        ));
    }
    result.add_message(CmdMessage::success(format!(
        "Exported to {}",
        path.display()
    )));
    Ok(result)
}

/// Same envelope as [`run`], returned as text instead of written to a file.
pub fn run_to_string<B: KvBackend>(store: &LocalStore<B>, now: DateTime<Utc>) -> Result<CmdResult> {
    let envelope = export_current_state(store, now);
    Ok(CmdResult::default().with_backup_json(to_pretty_json(&envelope)?))
}
