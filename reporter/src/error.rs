use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions of a report run.
///
/// Library functions return [`anyhow::Result`] and wrap these with context, so callers that need
/// to branch on the kind of failure should use [`anyhow::Error::downcast_ref`].
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Input file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Input file contains no records: {}", path.display())]
    EmptyInput { path: PathBuf },
    #[error("Invalid input: {reason}")]
    Schema { reason: String },
    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{failed} out of {total} charts failed to render: {}", reasons.join("; "))]
    Render {
        failed: usize,
        total: usize,
        reasons: Vec<String>,
    },
}

impl ReportError {
    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Find the first [`ReportError`] in the chain of an [`anyhow::Error`].
pub fn find_report_error(error: &anyhow::Error) -> Option<&ReportError> {
    error.chain().find_map(|e| e.downcast_ref::<ReportError>())
}
