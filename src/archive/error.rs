//! Error type for a whole archive run.

use thiserror::Error;

use crate::api::ApiError;
use crate::persist::PersistError;
use crate::record::RecordError;

/// Errors that stop an archive run.
///
/// Every error is fatal: the run stops at the first failure and whatever was
/// written so far stays on disk for the next run to overwrite.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Bootstrap, page fetch or decode failure.
    #[error(transparent)]
    Api(ApiError),

    /// Record write or asset download failure.
    #[error(transparent)]
    Persist(PersistError),

    /// A record lacks a field the traversal needs.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The run was cancelled by the user.
    #[error("archive run interrupted")]
    Interrupted,
}

impl From<ApiError> for ArchiveError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Interrupted { .. } => Self::Interrupted,
            other => Self::Api(other),
        }
    }
}

impl From<PersistError> for ArchiveError {
    fn from(error: PersistError) -> Self {
        match error {
            PersistError::Interrupted { .. } => Self::Interrupted,
            other => Self::Persist(other),
        }
    }
}

impl ArchiveError {
    /// Whether the run ended because of a user interrupt.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_request_becomes_interrupted_run() {
        let error = ArchiveError::from(ApiError::Interrupted {
            url: "http://x/api/items?page=3".to_string(),
        });
        assert!(error.is_interrupted());
        assert!(!ArchiveError::from(ApiError::status("http://x", 500)).is_interrupted());
    }

    #[test]
    fn test_interrupted_download_becomes_interrupted_run() {
        let error = ArchiveError::from(PersistError::Interrupted {
            url: "http://x/a.jpg".to_string(),
        });
        assert!(error.is_interrupted());
    }

    #[test]
    fn test_download_failure_stays_persist_error() {
        let error = ArchiveError::from(PersistError::download("http://x/a.jpg", 500));
        assert!(matches!(error, ArchiveError::Persist(PersistError::Download { .. })));
        assert!(error.to_string().contains("500"));
    }
}
