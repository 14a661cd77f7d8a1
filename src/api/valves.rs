//! Valve record API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{InspectionListResponse, ListValvesQuery, ValveListResponse, ValveRequest};

/// List valves.
#[utoipa::path(
    get,
    path = "/api/v1/valves",
    tag = "Valves",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on TAG, manufacturer, model or serial number")
    ),
    responses(
        (status = 200, description = "Valves ordered by TAG", body = ValveListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn list_valves(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ListValvesQuery>,
) -> AppResult<HttpResponse> {
    let valves = pool.list_valves(&auth.ctx, query.search.as_deref()).await?;
    let total = valves.len();
    Ok(HttpResponse::Ok().json(ValveListResponse { valves, total }))
}

#[utoipa::path(
    get,
    path = "/api/v1/valves/{valve_id}",
    tag = "Valves",
    params(
        ("valve_id" = Uuid, Path, description = "Valve UUID")
    ),
    responses(
        (status = 200, description = "Valve", body = crate::models::Valve),
        (status = 404, description = "Valve not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn get_valve(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let valve_id = path.into_inner();
    let valve = pool
        .get_valve(&auth.ctx, valve_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Valve {}", valve_id)))?;
    Ok(HttpResponse::Ok().json(valve))
}

/// Create a valve. TAG is required.
#[utoipa::path(
    post,
    path = "/api/v1/valves",
    tag = "Valves",
    request_body = ValveRequest,
    responses(
        (status = 201, description = "Valve created", body = crate::models::Valve),
        (status = 403, description = "Role cannot modify records", body = crate::error::ErrorResponse),
        (status = 422, description = "TAG missing", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn create_valve(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<ValveRequest>,
) -> AppResult<HttpResponse> {
    let valve = pool.create_valve(&auth.ctx, body.into_inner()).await?;
    info!(valve_id = %valve.id, tag = %valve.tag, profile = %auth.ctx.profile_id, "Valve created");
    Ok(HttpResponse::Created().json(valve))
}

#[utoipa::path(
    put,
    path = "/api/v1/valves/{valve_id}",
    tag = "Valves",
    params(
        ("valve_id" = Uuid, Path, description = "Valve UUID")
    ),
    request_body = ValveRequest,
    responses(
        (status = 200, description = "Valve updated", body = crate::models::Valve),
        (status = 403, description = "Role cannot modify records", body = crate::error::ErrorResponse),
        (status = 404, description = "Valve not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_valve(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<ValveRequest>,
) -> AppResult<HttpResponse> {
    let valve = pool
        .update_valve(&auth.ctx, path.into_inner(), body.into_inner())
        .await?;
    info!(valve_id = %valve.id, profile = %auth.ctx.profile_id, "Valve updated");
    Ok(HttpResponse::Ok().json(valve))
}

#[utoipa::path(
    delete,
    path = "/api/v1/valves/{valve_id}",
    tag = "Valves",
    params(
        ("valve_id" = Uuid, Path, description = "Valve UUID")
    ),
    responses(
        (status = 204, description = "Valve deleted"),
        (status = 403, description = "Role cannot modify records", body = crate::error::ErrorResponse),
        (status = 404, description = "Valve not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn delete_valve(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let valve_id = path.into_inner();
    pool.delete_valve(&auth.ctx, valve_id).await?;
    info!(valve_id = %valve_id, profile = %auth.ctx.profile_id, "Valve deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Inspection history of a valve, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/valves/{valve_id}/inspections",
    tag = "Valves",
    params(
        ("valve_id" = Uuid, Path, description = "Valve UUID")
    ),
    responses(
        (status = 200, description = "Inspections of the valve", body = InspectionListResponse),
        (status = 404, description = "Valve not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn list_valve_inspections(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let inspections = pool
        .list_valve_inspections(&auth.ctx, path.into_inner())
        .await?;
    let total = inspections.len();
    Ok(HttpResponse::Ok().json(InspectionListResponse { inspections, total }))
}

/// Configure valve routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/valves")
            .route(web::get().to(list_valves))
            .route(web::post().to(create_valve)),
    )
    .service(
        web::resource("/valves/{valve_id}")
            .route(web::get().to(get_valve))
            .route(web::put().to(update_valve))
            .route(web::delete().to(delete_valve)),
    )
    .service(
        web::resource("/valves/{valve_id}/inspections").route(web::get().to(list_valve_inspections)),
    );
}
