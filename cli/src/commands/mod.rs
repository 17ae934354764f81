//! Command implementations

pub mod instances;
pub mod logon;

use std::process::ExitCode;

/// Exit code of a command whose pipeline reported success or failure.
#[must_use]
pub fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
