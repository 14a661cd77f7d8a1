//! Inspection report endpoints.

use actix_web::{HttpResponse, get, http::header, web};
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::{InspectionReport, ReportRenderer};

/// Configure report routes.
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_inspection_report);
}

/// Get the HTML report of an inspection.
///
/// GET /inspections/{id}/report
///
/// Standalone document with the valve data, inspection data, component
/// table, required actions and photos grouped by stage.
#[utoipa::path(
    get,
    path = "/api/v1/inspections/{id}/report",
    tag = "Reports",
    params(
        ("id" = String, Path, description = "Inspection UUID")
    ),
    responses(
        (status = 200, description = "HTML report content", content_type = "text/html"),
        (status = 404, description = "Inspection not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer" = [])
    )
)]
#[get("/inspections/{id}/report")]
pub async fn get_inspection_report(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    renderer: web::Data<ReportRenderer>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = Uuid::parse_str(&path.into_inner())?;

    let (inspection, valve) = pool
        .get_inspection(&auth.ctx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inspection {}", id)))?;

    let report = InspectionReport {
        components: pool.list_inspection_components(id).await?,
        actions: pool.list_inspection_actions(id).await?,
        photos: pool.list_inspection_photos(id).await?,
        valve,
        inspection,
    };
    let html = renderer.render(&report)?;

    info!(inspection_id = %id, profile = %auth.ctx.profile_id, "Inspection report rendered");

    let filename = format!(
        "inspecao-{}-{}.html",
        report.valve.tag.replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', "_"),
        report
            .inspection
            .started_at
            .unwrap_or(report.inspection.created_at)
            .format("%Y%m%d")
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        ))
        .body(html))
}
