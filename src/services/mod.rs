//! Business logic services.

pub mod report;
pub mod sessions;
pub mod storage;
pub mod wizard;

pub use report::{InspectionReport, ReportRenderer};
pub use sessions::{WizardSessions, start_eviction_task};
pub use storage::Storage;
