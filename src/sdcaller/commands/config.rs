use crate::commands::{CmdMessage, CmdResult};
use crate::config::AppConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

/// Show or change configuration. Bad keys and values come back as
/// error-level messages; only I/O on `config.json` is an `Err`.
pub fn run(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    let mut config = AppConfig::load(config_dir)?;

    let outcome = match action {
        ConfigAction::ShowAll => CmdResult::default().with_config(config),
        ConfigAction::ShowKey(key) => match config.get(&key) {
            Some(value) => CmdResult::default().with_message(CmdMessage::info(value)),
            None => CmdResult::default()
                .with_message(CmdMessage::error(format!("Unknown config key: {}", key))),
        },
        ConfigAction::Set(key, value) => {
            if let Err(reason) = config.set(&key, &value) {
                return Ok(CmdResult::default().with_message(CmdMessage::error(reason)));
            }
            config.save(config_dir)?;
            let shown = match config.get(&key) {
                Some(v) if !v.is_empty() => v,
                _ => "(unset)".to_string(),
            };
            CmdResult::default()
                .with_message(CmdMessage::success(format!("{} set to {}", key, shown)))
                .with_config(config)
        }
    };
    Ok(outcome)
}
