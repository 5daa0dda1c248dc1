use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::schema::ProfileSchema;
use crate::store::{KvBackend, LocalStore, StoredState, USER_KEY};

/// Health of the store and of the profile stored in it.
#[derive(Debug)]
pub struct DoctorReport {
    pub store_available: bool,
    pub profile: StoredState<crate::model::UserProfile>,
}

pub fn check<B: KvBackend>(store: &LocalStore<B>) -> DoctorReport {
    DoctorReport {
        store_available: store.is_available(),
        profile: store.inspect(USER_KEY, &ProfileSchema),
    }
}

pub fn run<B: KvBackend>(store: &LocalStore<B>) -> Result<CmdResult> {
    let report = check(store);
    let mut result = CmdResult::default();

    if report.store_available {
        result.add_message(CmdMessage::success("Storage is writable."));
    } else {
        result.add_message(CmdMessage::error(
            "Storage is not available: changes cannot be saved.",
        ));
    }

    match report.profile {
        StoredState::Absent => {
            result.add_message(CmdMessage::info("No profile stored."));
        }
        StoredState::Valid(profile) => {
            result.add_message(CmdMessage::success(format!(
                "Profile for {} is valid.",
                profile.name
            )));
            result = result.with_profile(profile);
        }
        StoredState::Unreadable(reason) => {
            result.add_message(CmdMessage::error(format!(
                "Stored profile could not be read: {}",
                reason
            )));
        }
        StoredState::Malformed(reason) => {
            result.add_message(CmdMessage::error(format!(
                "Stored profile is not valid JSON: {}",
                reason
            )));
            result.add_message(CmdMessage::info(
                "Export still preserves the raw data; reset or import to replace it.",
            ));
        }
        StoredState::Invalid(rejection) => {
            result.add_message(CmdMessage::warning(format!(
                "Stored profile does not match the current format: {}",
                rejection
            )));
            result.add_message(CmdMessage::info(
                "Export still preserves the raw data; reset or import to replace it.",
            ));
        }
    }

    Ok(result)
}
