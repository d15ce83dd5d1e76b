//! Exit code logic for the archiver process.
//!
//! Single responsibility: map the outcome of a run to the process exit status.

use std::process::ExitCode;

use omeka_archive_core::ArchiveError;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
    Interrupted,
}

impl ProcessExit {
    pub(crate) fn code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::FAILURE,
            // Conventional status for termination by SIGINT.
            Self::Interrupted => ExitCode::from(130),
        }
    }
}

/// Classifies a failed run.
pub(crate) fn determine_exit_outcome(error: &anyhow::Error) -> ProcessExit {
    match error.downcast_ref::<ArchiveError>() {
        Some(archive_error) if archive_error.is_interrupted() => ProcessExit::Interrupted,
        _ => ProcessExit::Failure,
    }
}
