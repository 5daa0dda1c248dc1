//! Profile lifecycle: create, show, rename, record practice, preferences.
//!
//! All mutations go through the [`ProfileBinding`] with `try_set`, so a
//! failed write surfaces as an error instead of a silent no-op.

use crate::binding::ProfileBinding;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SdCallerError};
use crate::model::{PracticeSession, UserPreferences, UserProfile};
use crate::schema::validate_display_name;
use crate::store::{KvBackend, LocalStore};
use chrono::{DateTime, Utc};

fn require_profile<B: KvBackend>(binding: &ProfileBinding<'_, B>) -> Result<UserProfile> {
    binding
        .get()
        .cloned()
        .ok_or_else(|| SdCallerError::Api("No profile found. Create one first.".to_string()))
}

pub fn create<B: KvBackend>(
    store: &LocalStore<B>,
    name: &str,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let name = validate_display_name(name)?;
    let mut binding = ProfileBinding::profile(store);

    if let Some(existing) = binding.get() {
        return Err(SdCallerError::Api(format!(
            "A profile for {} already exists. Rename it or reset first.",
            existing.name
        )));
    }

    let profile = UserProfile::new(name, now);
    binding.try_set(Some(profile.clone()))?;

    let mut result = CmdResult::default().with_profile(profile.clone());
    result.add_message(CmdMessage::success(format!(
        "Welcome, {}! Profile created.",
        profile.name
    )));
    Ok(result)
}

pub fn show<B: KvBackend>(store: &LocalStore<B>) -> Result<CmdResult> {
    let binding = ProfileBinding::profile(store);
    match binding.get() {
        Some(profile) => Ok(CmdResult::default().with_profile(profile.clone())),
        None => {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info("No profile yet."));
            Ok(result)
        }
    }
}

pub fn rename<B: KvBackend>(store: &LocalStore<B>, name: &str) -> Result<CmdResult> {
    let name = validate_display_name(name)?;
    let mut binding = ProfileBinding::profile(store);
    let mut profile = require_profile(&binding)?;

    let old = std::mem::replace(&mut profile.name, name);
    binding.try_set(Some(profile.clone()))?;

    let mut result = CmdResult::default().with_profile(profile.clone());
    result.add_message(CmdMessage::success(format!(
        "Renamed {} to {}",
        old, profile.name
    )));
    Ok(result)
}

pub fn record<B: KvBackend>(store: &LocalStore<B>, session: PracticeSession) -> Result<CmdResult> {
    let mut binding = ProfileBinding::profile(store);
    let mut profile = require_profile(&binding)?;

    profile.stats.record(&session);
    binding.try_set(Some(profile.clone()))?;

    let mut result = CmdResult::default().with_profile(profile.clone());
    result.add_message(CmdMessage::success(format!(
        "Session {} recorded: {} call(s), {} successful, {} failed",
        profile.stats.total_sessions, session.calls, session.successful, session.failed
    )));
    Ok(result)
}

/// Update the preference flags. `None` leaves a flag as it is.
pub fn set_preferences<B: KvBackend>(
    store: &LocalStore<B>,
    auto_play_animations: Option<bool>,
    show_flow_hints: Option<bool>,
) -> Result<CmdResult> {
    let mut binding = ProfileBinding::profile(store);
    let mut profile = require_profile(&binding)?;

    if auto_play_animations.is_none() && show_flow_hints.is_none() {
        let mut result = CmdResult::default().with_profile(profile);
        result.add_message(CmdMessage::info("No preference changed."));
        return Ok(result);
    }

    let mut prefs = profile.preferences.unwrap_or_default();
    if auto_play_animations.is_some() {
        prefs.auto_play_animations = auto_play_animations;
    }
    if show_flow_hints.is_some() {
        prefs.show_flow_hints = show_flow_hints;
    }
    profile.preferences = Some(prefs);
    binding.try_set(Some(profile.clone()))?;

    let mut result = CmdResult::default().with_profile(profile);
    result.add_message(CmdMessage::success("Preferences saved."));
    Ok(result)
}

/// Drop stored preferences so every flag falls back to its default.
pub fn reset_preferences<B: KvBackend>(store: &LocalStore<B>) -> Result<CmdResult> {
    let mut binding = ProfileBinding::profile(store);
    let mut profile = require_profile(&binding)?;

    profile.preferences = None;
    binding.try_set(Some(profile.clone()))?;

    let mut result = CmdResult::default().with_profile(profile);
    result.add_message(CmdMessage::success(format!(
        "Preferences reset to defaults (auto-play {}, flow hints {}).",
        on_off(UserPreferences::DEFAULT_AUTO_PLAY_ANIMATIONS),
        on_off(UserPreferences::DEFAULT_SHOW_FLOW_HINTS)
    )));
    Ok(result)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
