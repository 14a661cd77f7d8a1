//! API endpoint modules.

pub mod companies;
pub mod health;
pub mod openapi;
pub mod reports;
pub mod valves;
pub mod wizard;

pub use companies::configure_routes as configure_company_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use reports::configure_report_routes;
pub use valves::configure_routes as configure_valve_routes;
pub use wizard::configure_routes as configure_wizard_routes;
