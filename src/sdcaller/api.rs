//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every UI, whether the bundled CLI or anything else.
//!
//! Two groups of methods live here:
//!
//! - The **collaborator interface** a presentation layer calls directly:
//!   [`CallerApi::load_profile`], [`CallerApi::save_profile`],
//!   [`CallerApi::export_backup`], [`CallerApi::trigger_download`],
//!   [`CallerApi::load_backup_from_file`], [`CallerApi::import_backup`].
//!   These return sentinels (`Option`, `bool`) rather than errors, except
//!   `save_profile`, which reports write failures.
//! - **Command methods** returning `Result<CmdResult>` for the CLI.
//!
//! ## Generic Over KvBackend
//!
//! `CallerApi<B: KvBackend>`:
//! - Production: `CallerApi<FileBackend>`
//! - Testing: `CallerApi<MemBackend>`
//!
//! The clock is passed in by the caller wherever a timestamp is taken, so
//! tests can pin it.

use crate::commands;
use crate::config::AppConfig;
use crate::error::{Result, SdCallerError};
use crate::model::{BackupEnvelope, PracticeSession, UserProfile, ValidatedEnvelope};
use crate::schema::{self, ProfileSchema};
use crate::store::{KvBackend, LocalStore, USER_KEY};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Where the CLI keeps its files.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Store and config directory.
    pub data: PathBuf,
    /// Fallback output directory for exports.
    pub cwd: PathBuf,
}

pub struct CallerApi<B: KvBackend> {
    store: LocalStore<B>,
    paths: AppPaths,
}

impl<B: KvBackend> CallerApi<B> {
    pub fn new(store: LocalStore<B>, paths: AppPaths) -> Self {
        Self { store, paths }
    }

    pub fn store(&self) -> &LocalStore<B> {
        &self.store
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    // --- Collaborator interface ---

    pub fn load_profile(&self) -> Option<UserProfile> {
        self.store.load(USER_KEY, &ProfileSchema)
    }

    /// Validate and persist `profile`, replacing the stored one.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_value(profile).map_err(SdCallerError::Serialization)?;
        let checked = schema::validate_profile(&raw)?;
        self.store.try_save(USER_KEY, &checked)
    }

    pub fn export_backup(&self, now: DateTime<Utc>) -> BackupEnvelope {
        commands::export::export_current_state(&self.store, now)
    }

    /// Write the envelope to `dir` (or the configured backup directory).
    pub fn trigger_download(
        &self,
        envelope: &BackupEnvelope,
        dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let config = self.config()?;
        let dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.backup_dir_or(&self.paths.cwd));
        commands::export::serialize_and_offer_as_file(envelope, &dir, &config.backup_prefix)
    }

    pub fn load_backup_from_file(&self, path: &Path) -> Option<ValidatedEnvelope> {
        commands::import::load_envelope_from_file(path)
    }

    pub fn import_backup(&self, raw: &Value) -> bool {
        commands::import::import_and_apply(&self.store, raw)
    }

    // --- Commands ---

    pub fn create_profile(&self, name: &str, now: DateTime<Utc>) -> Result<commands::CmdResult> {
        commands::profile::create(&self.store, name, now)
    }

    pub fn show_profile(&self) -> Result<commands::CmdResult> {
        commands::profile::show(&self.store)
    }

    pub fn rename_profile(&self, name: &str) -> Result<commands::CmdResult> {
        commands::profile::rename(&self.store, name)
    }

    pub fn record_session(&self, session: PracticeSession) -> Result<commands::CmdResult> {
        commands::profile::record(&self.store, session)
    }

    pub fn set_preferences(
        &self,
        auto_play_animations: Option<bool>,
        show_flow_hints: Option<bool>,
    ) -> Result<commands::CmdResult> {
        commands::profile::set_preferences(&self.store, auto_play_animations, show_flow_hints)
    }

    pub fn reset_preferences(&self) -> Result<commands::CmdResult> {
        commands::profile::reset_preferences(&self.store)
    }

    pub fn export(&self, dir: Option<&Path>, now: DateTime<Utc>) -> Result<commands::CmdResult> {
        let config = self.config()?;
        let dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.backup_dir_or(&self.paths.cwd));
        commands::export::run(&self.store, &dir, &config.backup_prefix, now)
    }

    pub fn export_to_string(&self, now: DateTime<Utc>) -> Result<commands::CmdResult> {
        commands::export::run_to_string(&self.store, now)
    }

    pub fn preview_import(&self, raw: &Value) -> Result<commands::import::ImportPreview> {
        commands::import::preview(&self.store, raw)
    }

    pub fn import(&self, raw: &Value) -> Result<commands::CmdResult> {
        commands::import::run(&self.store, raw)
    }

    pub fn reset(&self) -> Result<commands::CmdResult> {
        commands::reset::run(&self.store)
    }

    pub fn doctor(&self) -> Result<commands::CmdResult> {
        commands::doctor::run(&self.store)
    }

    pub fn config(&self) -> Result<AppConfig> {
        AppConfig::load(&self.paths.data)
    }

    pub fn config_action(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths.data, action)
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::import::ImportPreview;
pub use commands::{CmdMessage, CmdResult, MessageLevel};
