//! Inspection wizard: step sequencing, buffered inspection data and the
//! test-tolerance rule.
//!
//! The wizard talks to the outside world only through [`InspectionStore`]
//! and [`FileStore`], so the HTTP layer drives it with the database and S3
//! while tests drive it with in-memory fakes.

mod cancel;
mod machine;
mod notice;
mod photos;
mod steps;
mod store;
mod test_flow;
pub mod tolerance;

pub use cancel::CancelSignal;
pub use machine::{
    FinalizePart, FinalizeProgress, InspectionWizard, Transition, WizardSnapshot, WizardStatus,
};
pub use notice::{Notice, NoticeLevel};
pub use photos::{IncomingFile, MediaKind};
pub use steps::{REGISTRY_STEPS, StepDescriptor, TESTS_STEPS, TestStage, WizardMode, WizardStep};
pub use store::{FileStore, InspectionStore};
pub use test_flow::{TestSnapshot, TestVideo};
pub use tolerance::{TestEvaluation, ToleranceBand};

use crate::error::AppError;

/// Wizard failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    /// The backend rejected a create/update/delete
    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    /// A required field is missing; no remote call was attempted
    #[error("{0}")]
    Validation(String),

    /// One file of a batch could not be stored
    #[error("Upload of '{filename}' failed: {reason}")]
    Upload { filename: String, reason: String },

    #[error("Operation not available at step '{0}'")]
    WrongStep(&'static str),

    #[error("The inspection has not been created yet")]
    NoInspection,

    #[error("Mode and test selection are locked for this session")]
    SelectionLocked,

    /// Inspection fields are fixed once the inspection record exists
    #[error("Inspection fields are already saved")]
    FieldsLocked,

    /// Buffered data that finalize already persisted
    #[error("{0} were already saved")]
    AlreadySaved(&'static str),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Wizard session is finished")]
    Finished,
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::RemoteWrite(msg) => AppError::Database(msg),
            WizardError::Validation(msg) => AppError::Validation(msg),
            WizardError::Upload { .. } => AppError::Storage(err.to_string()),
            WizardError::NotFound(what) => AppError::NotFound(what),
            WizardError::WrongStep(_)
            | WizardError::NoInspection
            | WizardError::SelectionLocked
            | WizardError::FieldsLocked
            | WizardError::AlreadySaved(_)
            | WizardError::Cancelled
            | WizardError::Finished => AppError::Conflict(err.to_string()),
        }
    }
}
