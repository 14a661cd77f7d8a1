//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PSV Inspection Server",
        version = "0.1.0",
        description = "API server for pressure safety valve records, step-by-step inspections and inspection reports"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Valve endpoints
        api::valves::list_valves,
        api::valves::get_valve,
        api::valves::create_valve,
        api::valves::update_valve,
        api::valves::delete_valve,
        api::valves::list_valve_inspections,
        // Company endpoints
        api::companies::list_companies,
        api::companies::create_company,
        api::companies::list_plants,
        api::companies::create_plant,
        // Wizard endpoints
        api::wizard::start_wizard,
        api::wizard::get_wizard,
        api::wizard::set_mode,
        api::wizard::update_fields,
        api::wizard::advance,
        api::wizard::retreat,
        api::wizard::delete_inspection,
        api::wizard::close_wizard,
        api::wizard::add_component,
        api::wizard::update_component,
        api::wizard::remove_component,
        api::wizard::toggle_action,
        api::wizard::upload_photos,
        api::wizard::update_photo_caption,
        api::wizard::remove_photo,
        api::wizard::update_test_readings,
        api::wizard::upload_test_video,
        // Report endpoints
        api::reports::get_inspection_report,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Valves
            models::Valve,
            models::ValveStatus,
            models::ValveRef,
            models::ValveRequest,
            models::ValveListResponse,
            models::ListValvesQuery,
            // Companies
            models::Company,
            models::Plant,
            models::CreateCompanyRequest,
            models::CreatePlantRequest,
            models::ListPlantsQuery,
            api::companies::CompanyListResponse,
            api::companies::PlantListResponse,
            // Inspections
            models::Inspection,
            models::InspectionKind,
            models::InspectionFields,
            models::InspectionListResponse,
            models::TestFluid,
            models::ComponentName,
            models::ComponentCondition,
            models::ComponentRecord,
            models::InspectionComponent,
            models::RequiredAction,
            models::RequiredActionRow,
            models::Photo,
            models::PhotoStep,
            models::UpdateCaptionRequest,
            models::TestType,
            models::TestComponent,
            models::TestSelection,
            models::TestReadings,
            // Wizard
            services::wizard::WizardMode,
            services::wizard::TestStage,
            services::wizard::WizardStatus,
            services::wizard::Transition,
            services::wizard::FinalizePart,
            services::wizard::FinalizeProgress,
            services::wizard::WizardSnapshot,
            services::wizard::StepDescriptor,
            services::wizard::Notice,
            services::wizard::NoticeLevel,
            services::wizard::TestSnapshot,
            services::wizard::TestVideo,
            services::wizard::TestEvaluation,
            services::wizard::ToleranceBand,
            api::wizard::WizardResponse,
            api::wizard::WizardFailureResponse,
            api::wizard::SetModeRequest,
            api::wizard::ActionToggleResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Valves", description = "Valve records and inspection history"),
        (name = "Companies", description = "Companies and plants"),
        (name = "Wizard", description = "Step-by-step inspection sessions"),
        (name = "Reports", description = "Inspection report export")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
