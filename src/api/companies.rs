//! Company and plant API handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{Company, CreateCompanyRequest, CreatePlantRequest, ListPlantsQuery, Plant};

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyListResponse {
    pub companies: Vec<Company>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlantListResponse {
    pub plants: Vec<Plant>,
    pub total: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/companies",
    tag = "Companies",
    responses(
        (status = 200, description = "Companies visible to the caller", body = CompanyListResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn list_companies(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let companies = pool.list_companies(&auth.ctx).await?;
    let total = companies.len();
    Ok(HttpResponse::Ok().json(CompanyListResponse { companies, total }))
}

#[utoipa::path(
    post,
    path = "/api/v1/companies",
    tag = "Companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 403, description = "Role cannot modify records", body = crate::error::ErrorResponse),
        (status = 422, description = "Name missing", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn create_company(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateCompanyRequest>,
) -> AppResult<HttpResponse> {
    let company = pool.create_company(&auth.ctx, body.into_inner()).await?;
    info!(company_id = %company.id, profile = %auth.ctx.profile_id, "Company created");
    Ok(HttpResponse::Created().json(company))
}

#[utoipa::path(
    get,
    path = "/api/v1/plants",
    tag = "Companies",
    params(
        ("empresa_id" = Option<uuid::Uuid>, Query, description = "Only plants of this company")
    ),
    responses(
        (status = 200, description = "Plants visible to the caller", body = PlantListResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn list_plants(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ListPlantsQuery>,
) -> AppResult<HttpResponse> {
    let plants = pool.list_plants(&auth.ctx, query.empresa_id).await?;
    let total = plants.len();
    Ok(HttpResponse::Ok().json(PlantListResponse { plants, total }))
}

#[utoipa::path(
    post,
    path = "/api/v1/plants",
    tag = "Companies",
    request_body = CreatePlantRequest,
    responses(
        (status = 201, description = "Plant created", body = Plant),
        (status = 403, description = "Role cannot modify records", body = crate::error::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn create_plant(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreatePlantRequest>,
) -> AppResult<HttpResponse> {
    let plant = pool.create_plant(&auth.ctx, body.into_inner()).await?;
    info!(plant_id = %plant.id, profile = %auth.ctx.profile_id, "Plant created");
    Ok(HttpResponse::Created().json(plant))
}

/// Configure company and plant routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/companies")
            .route(web::get().to(list_companies))
            .route(web::post().to(create_company)),
    )
    .service(
        web::resource("/plants")
            .route(web::get().to(list_plants))
            .route(web::post().to(create_plant)),
    );
}
