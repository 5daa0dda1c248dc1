use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::schema::ProfileSchema;
use crate::store::{KvBackend, LocalStore, USER_KEY};

/// Removes everything this application stored. Does NOT prompt; the CLI
/// confirms first.
pub fn run<B: KvBackend>(store: &LocalStore<B>) -> Result<CmdResult> {
    let existing = store.load(USER_KEY, &ProfileSchema);
    store.clear_known_keys();

    let mut result = CmdResult::default();
    match existing {
        Some(profile) => result.add_message(CmdMessage::success(format!(
            "Removed profile for {}.",
            profile.name
        ))),
        None => result.add_message(CmdMessage::info("Cleared stored data.")),
    }
    Ok(result)
}
