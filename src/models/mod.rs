//! Domain models for the PSV inspection server.

pub mod action;
pub mod company;
pub mod component;
pub mod inspection;
pub mod photo;
pub mod profile;
pub mod test_run;
pub mod valve;

// Re-export commonly used types
pub use action::{RequiredAction, RequiredActionRow};
pub use company::{Company, CreateCompanyRequest, CreatePlantRequest, ListPlantsQuery, Plant};
pub use component::{ComponentCondition, ComponentName, ComponentRecord, InspectionComponent};
pub use inspection::{
    Inspection, InspectionFields, InspectionKind, InspectionListResponse, NewInspection, TestFluid,
};
pub use photo::{NewPhotoRecord, Photo, PhotoStep, UpdateCaptionRequest};
pub use profile::{Profile, SessionClaims, UserRole};
pub use test_run::{TestComponent, TestReadings, TestSelection, TestType};
pub use valve::{
    DEFAULT_MANUFACTURER, DEFAULT_PERIODICITY_MONTHS, ListValvesQuery, Valve, ValveListResponse,
    ValveRef, ValveRequest, ValveStatus,
};
