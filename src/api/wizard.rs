//! Inspection wizard API handlers.
//!
//! Every handler locks the session's wizard for the whole call, so one
//! wizard is driven by one request at a time. Successful calls return the
//! fresh snapshot and the notifications the call produced; failed wizard
//! operations return the same payload with the error code alongside.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, ResponseError, web};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::SessionAuth;
use crate::config::UploadSettings;
use crate::error::{AppError, AppResult};
use crate::models::{
    ComponentRecord, InspectionFields, Photo, RequiredAction, TestComponent, TestReadings,
    TestSelection, UpdateCaptionRequest,
};
use crate::services::WizardSessions;
use crate::services::wizard::{
    IncomingFile, InspectionWizard, Notice, Transition, WizardError, WizardMode, WizardSnapshot,
};

/// Successful wizard call.
#[derive(Debug, Serialize, ToSchema)]
pub struct WizardResponse {
    pub session_id: Uuid,
    /// Navigation outcome, for advance/retreat/delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    /// Photos stored by an upload call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<Vec<Photo>>,
    pub snapshot: WizardSnapshot,
    pub notifications: Vec<Notice>,
}

/// Failed wizard call. The snapshot reflects the unchanged state.
#[derive(Debug, Serialize, ToSchema)]
pub struct WizardFailureResponse {
    pub error: String,
    pub message: String,
    pub snapshot: WizardSnapshot,
    pub notifications: Vec<Notice>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetModeRequest {
    pub mode: WizardMode,
    #[serde(default)]
    pub test_selection: TestSelection,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActionToggleResponse {
    pub action: RequiredAction,
    pub selected: bool,
    pub snapshot: WizardSnapshot,
    pub notifications: Vec<Notice>,
}

fn success(
    session_id: Uuid,
    wizard: &mut InspectionWizard,
    transition: Option<Transition>,
) -> HttpResponse {
    HttpResponse::Ok().json(WizardResponse {
        session_id,
        transition,
        uploaded: None,
        notifications: wizard.drain_notices(),
        snapshot: wizard.snapshot(),
    })
}

fn failure(wizard: &mut InspectionWizard, err: WizardError) -> HttpResponse {
    let app_err = AppError::from(err);
    if let AppError::Database(detail) | AppError::Storage(detail) = &app_err {
        warn!(inspection_id = ?wizard.inspection_id(), error = %detail, "Wizard call failed");
    }
    HttpResponse::build(app_err.status_code()).json(WizardFailureResponse {
        error: app_err.code().to_string(),
        message: app_err.public_message(),
        notifications: wizard.drain_notices(),
        snapshot: wizard.snapshot(),
    })
}

fn respond<T>(
    session_id: Uuid,
    wizard: &mut InspectionWizard,
    result: Result<T, WizardError>,
    transition: impl FnOnce(T) -> Option<Transition>,
) -> HttpResponse {
    match result {
        Ok(value) => {
            let transition = transition(value);
            success(session_id, wizard, transition)
        }
        Err(err) => failure(wizard, err),
    }
}

/// Read every file part of a multipart body. Parts without a filename are
/// skipped. Files over `max_size` are truncated to `max_size + 1` bytes so
/// the size check rejects them without buffering the rest. The request is
/// rejected as soon as a file part beyond `max_files` arrives.
async fn read_files(
    mut payload: Multipart,
    max_size: usize,
    max_files: usize,
) -> AppResult<Vec<IncomingFile>> {
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.to_string());
        let content_type = field.content_type().map(|mime| mime.to_string());

        if filename.is_some() && files.len() >= max_files {
            warn!(max_files, "Multipart upload has too many files");
            return Err(AppError::InvalidInput(format!(
                "At most {} files per upload",
                max_files
            )));
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() <= max_size {
                let room = max_size + 1 - data.len();
                data.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
        }

        if let Some(filename) = filename {
            let mut file = IncomingFile::new(filename, data);
            file.content_type = content_type;
            files.push(file);
        }
    }

    Ok(files)
}

/// Start a wizard session on a valve.
#[utoipa::path(
    post,
    path = "/api/v1/valves/{valve_id}/wizard",
    tag = "Wizard",
    params(
        ("valve_id" = Uuid, Path, description = "Valve UUID")
    ),
    responses(
        (status = 201, description = "Session started at mode selection", body = WizardResponse),
        (status = 403, description = "Role cannot run inspections", body = crate::error::ErrorResponse),
        (status = 404, description = "Valve not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn start_wizard(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let (session_id, wizard) = sessions.start(&auth.ctx, path.into_inner()).await?;
    let mut wizard = wizard.lock().await;
    Ok(HttpResponse::Created().json(WizardResponse {
        session_id,
        transition: None,
        uploaded: None,
        notifications: wizard.drain_notices(),
        snapshot: wizard.snapshot(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/wizard/{session_id}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    responses(
        (status = 200, description = "Current snapshot", body = WizardResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn get_wizard(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    Ok(success(session_id, &mut wizard, None))
}

/// Choose the mode and the test selection. Step 0 only.
#[utoipa::path(
    put,
    path = "/api/v1/wizard/{session_id}/mode",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    request_body = SetModeRequest,
    responses(
        (status = 200, description = "Mode set", body = WizardResponse),
        (status = 409, description = "Selection locked or wrong step", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn set_mode(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    body: web::Json<SetModeRequest>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let body = body.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.set_mode(body.mode, body.test_selection);
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

#[utoipa::path(
    put,
    path = "/api/v1/wizard/{session_id}/fields",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    request_body = InspectionFields,
    responses(
        (status = 200, description = "Fields updated", body = WizardResponse),
        (status = 409, description = "Fields already saved", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_fields(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    body: web::Json<InspectionFields>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.update_fields(body.into_inner());
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

/// Move forward. Creates the inspection when leaving the info step and
/// finalizes from the last step.
#[utoipa::path(
    post,
    path = "/api/v1/wizard/{session_id}/advance",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    responses(
        (status = 200, description = "Transition applied (including partial finalize)", body = WizardResponse),
        (status = 422, description = "Required field missing", body = WizardFailureResponse),
        (status = 500, description = "Inspection could not be created", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn advance(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.advance().await;
    if let Ok(Transition::Completed) = &result {
        info!(session_id = %session_id, inspection_id = ?wizard.inspection_id(), "Inspection finalized");
    }
    Ok(respond(session_id, &mut wizard, result, Some))
}

#[utoipa::path(
    post,
    path = "/api/v1/wizard/{session_id}/retreat",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    responses(
        (status = 200, description = "Moved back, or exit from step 0", body = WizardResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn retreat(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.retreat();
    Ok(respond(session_id, &mut wizard, result, Some))
}

/// Delete the inspection record with its photos and buffered data.
#[utoipa::path(
    delete,
    path = "/api/v1/wizard/{session_id}/inspection",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    responses(
        (status = 200, description = "Inspection deleted", body = WizardResponse),
        (status = 409, description = "No inspection yet", body = WizardFailureResponse),
        (status = 500, description = "Delete failed", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn delete_inspection(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.delete_inspection().await;
    Ok(respond(session_id, &mut wizard, result, Some))
}

/// Close the session. In-flight uploads are cancelled.
#[utoipa::path(
    delete,
    path = "/api/v1/wizard/{session_id}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn close_wizard(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    sessions.close(&auth.ctx, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/wizard/{session_id}/components",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    request_body = ComponentRecord,
    responses(
        (status = 200, description = "Component added", body = WizardResponse),
        (status = 409, description = "Wrong step or already saved", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn add_component(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    body: web::Json<ComponentRecord>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.add_component(body.into_inner());
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

#[utoipa::path(
    put,
    path = "/api/v1/wizard/{session_id}/components/{index}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id"),
        ("index" = usize, Path, description = "Position in the component list")
    ),
    request_body = ComponentRecord,
    responses(
        (status = 200, description = "Component replaced", body = WizardResponse),
        (status = 404, description = "No component at index", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_component(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<(Uuid, usize)>,
    body: web::Json<ComponentRecord>,
) -> AppResult<HttpResponse> {
    let (session_id, index) = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.update_component(index, body.into_inner());
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

#[utoipa::path(
    delete,
    path = "/api/v1/wizard/{session_id}/components/{index}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id"),
        ("index" = usize, Path, description = "Position in the component list")
    ),
    responses(
        (status = 200, description = "Component removed", body = WizardResponse),
        (status = 404, description = "No component at index", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn remove_component(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<(Uuid, usize)>,
) -> AppResult<HttpResponse> {
    let (session_id, index) = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.remove_component(index);
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

/// Toggle a required action in the checklist.
#[utoipa::path(
    put,
    path = "/api/v1/wizard/{session_id}/actions/{action}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id"),
        ("action" = String, Path, description = "Action identifier, e.g. `jato_pintura`")
    ),
    responses(
        (status = 200, description = "Action toggled", body = ActionToggleResponse),
        (status = 400, description = "Unknown action", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn toggle_action(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<(Uuid, String)>,
) -> AppResult<HttpResponse> {
    let (session_id, slug) = path.into_inner();
    let action = RequiredAction::from_slug(&slug)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown action '{}'", slug)))?;

    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    match wizard.toggle_action(action) {
        Ok(selected) => Ok(HttpResponse::Ok().json(ActionToggleResponse {
            action,
            selected,
            notifications: wizard.drain_notices(),
            snapshot: wizard.snapshot(),
        })),
        Err(err) => Ok(failure(&mut wizard, err)),
    }
}

/// Upload a batch of photos at the current photo step (multipart, one
/// part per file).
#[utoipa::path(
    post,
    path = "/api/v1/wizard/{session_id}/photos",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    request_body(content_type = "multipart/form-data", description = "Photo files"),
    responses(
        (status = 200, description = "Batch processed; failed files are listed in notifications", body = WizardResponse),
        (status = 409, description = "Not at a photo step", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn upload_photos(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    limits: web::Data<UploadSettings>,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let files = read_files(
        payload,
        limits.max_file_size,
        limits.max_files_per_request,
    )
    .await?;

    let mut wizard = wizard.lock().await;
    match wizard.upload_photos(files).await {
        Ok(stored) => Ok(HttpResponse::Ok().json(WizardResponse {
            session_id,
            transition: None,
            uploaded: Some(stored),
            notifications: wizard.drain_notices(),
            snapshot: wizard.snapshot(),
        })),
        Err(err) => Ok(failure(&mut wizard, err)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/wizard/{session_id}/photos/{photo_id}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id"),
        ("photo_id" = Uuid, Path, description = "Photo UUID")
    ),
    request_body = UpdateCaptionRequest,
    responses(
        (status = 200, description = "Caption updated", body = WizardResponse),
        (status = 404, description = "Photo not found", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_photo_caption(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateCaptionRequest>,
) -> AppResult<HttpResponse> {
    let (session_id, photo_id) = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard
        .update_photo_caption(photo_id, body.into_inner().caption)
        .await;
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

#[utoipa::path(
    delete,
    path = "/api/v1/wizard/{session_id}/photos/{photo_id}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id"),
        ("photo_id" = Uuid, Path, description = "Photo UUID")
    ),
    responses(
        (status = 200, description = "Photo removed", body = WizardResponse),
        (status = 404, description = "Photo not found", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn remove_photo(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (session_id, photo_id) = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.remove_photo(photo_id).await;
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

#[utoipa::path(
    put,
    path = "/api/v1/wizard/{session_id}/tests/readings",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id")
    ),
    request_body = TestReadings,
    responses(
        (status = 200, description = "Readings stored; the snapshot carries the evaluation", body = WizardResponse),
        (status = 409, description = "Not at the readings stage", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn update_test_readings(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    path: web::Path<Uuid>,
    body: web::Json<TestReadings>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let mut wizard = wizard.lock().await;
    let result = wizard.update_test_readings(body.into_inner());
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

/// Upload the confirmation video of a selected test (multipart, first file
/// part is used).
#[utoipa::path(
    post,
    path = "/api/v1/wizard/{session_id}/tests/videos/{component}",
    tag = "Wizard",
    params(
        ("session_id" = Uuid, Path, description = "Wizard session id"),
        ("component" = String, Path, description = "`pressao_abertura`, `estanqueidade` or `contrapressao`")
    ),
    request_body(content_type = "multipart/form-data", description = "Video file"),
    responses(
        (status = 200, description = "Video stored", body = WizardResponse),
        (status = 409, description = "Not at the videos stage", body = WizardFailureResponse),
        (status = 422, description = "Test not selected", body = WizardFailureResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
pub async fn upload_test_video(
    auth: SessionAuth,
    sessions: web::Data<WizardSessions>,
    limits: web::Data<UploadSettings>,
    path: web::Path<(Uuid, String)>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (session_id, component) = path.into_inner();
    let component = TestComponent::parse(&component)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown test '{}'", component)))?;

    let wizard = sessions.get(&auth.ctx, session_id).await?;
    let file = read_files(payload, limits.max_file_size, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InvalidInput("No file was sent".to_string()))?;

    let mut wizard = wizard.lock().await;
    let result = wizard.upload_test_video(component, file).await;
    Ok(respond(session_id, &mut wizard, result, |_| None))
}

/// Configure wizard routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/valves/{valve_id}/wizard").route(web::post().to(start_wizard)))
        .service(
            web::resource("/wizard/{session_id}")
                .route(web::get().to(get_wizard))
                .route(web::delete().to(close_wizard)),
        )
        .service(web::resource("/wizard/{session_id}/mode").route(web::put().to(set_mode)))
        .service(web::resource("/wizard/{session_id}/fields").route(web::put().to(update_fields)))
        .service(web::resource("/wizard/{session_id}/advance").route(web::post().to(advance)))
        .service(web::resource("/wizard/{session_id}/retreat").route(web::post().to(retreat)))
        .service(
            web::resource("/wizard/{session_id}/inspection")
                .route(web::delete().to(delete_inspection)),
        )
        .service(
            web::resource("/wizard/{session_id}/components").route(web::post().to(add_component)),
        )
        .service(
            web::resource("/wizard/{session_id}/components/{index}")
                .route(web::put().to(update_component))
                .route(web::delete().to(remove_component)),
        )
        .service(
            web::resource("/wizard/{session_id}/actions/{action}")
                .route(web::put().to(toggle_action)),
        )
        .service(web::resource("/wizard/{session_id}/photos").route(web::post().to(upload_photos)))
        .service(
            web::resource("/wizard/{session_id}/photos/{photo_id}")
                .route(web::put().to(update_photo_caption))
                .route(web::delete().to(remove_photo)),
        )
        .service(
            web::resource("/wizard/{session_id}/tests/readings")
                .route(web::put().to(update_test_readings)),
        )
        .service(
            web::resource("/wizard/{session_id}/tests/videos/{component}")
                .route(web::post().to(upload_test_video)),
        );
}
