//! Admin dashboard endpoints. Every route except login needs a bearer access
//! token; content routes also need the email to be whitelisted.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AdminSession, bearer_token, require_admin, resolve_session};
use crate::backend::storage::object_path;
use crate::csv_import::events_from_csv;
use crate::error::ApiError;
use crate::models::{AdminEmail, AdminPhoto, DocumentDraft, EventDraft, NewPhoto, PhotoUpdate};
use crate::validation::{validate_document, validate_email, validate_event};
use crate::AppState;

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn bearer(auth: BearerHeader) -> Option<Authorization<Bearer>> {
    auth.map(|TypedHeader(a)| a)
}

async fn admin(state: &AppState, auth: BearerHeader) -> Result<AdminSession, ApiError> {
    require_admin(state, bearer(auth)).await
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Original file name; only its extension is kept.
    pub filename: Option<String>,
    pub alt: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Magic link sent", body = Ack),
        (status = 400, description = "Email is required")
    ),
    tag = "admin"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_email(&request.email)?;
    state
        .backend
        .send_magic_link(email, &state.settings.magic_link_redirect())
        .await?;
    Ok(Json(Ack { ok: true }))
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses((status = 200, description = "Signed out", body = Ack)),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn logout(
    State(state): State<AppState>,
    auth: BearerHeader,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(bearer(auth))?;
    state.backend.sign_out(&token).await?;
    info!("signed out");
    Ok(Json(Ack { ok: true }))
}

#[utoipa::path(
    get,
    path = "/admin/session",
    responses(
        (status = 200, description = "Current user and access", body = AdminSession),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn session(
    State(state): State<AppState>,
    auth: BearerHeader,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(resolve_session(&state, bearer(auth)).await?))
}

#[utoipa::path(
    get,
    path = "/admin/admins",
    responses((status = 200, description = "Whitelisted emails", body = [AdminEmail])),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    auth: BearerHeader,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    let admins: Vec<AdminEmail> = session
        .admins
        .unwrap_or_default()
        .into_iter()
        .map(|email| AdminEmail { email })
        .collect();
    Ok(Json(admins))
}

#[utoipa::path(
    get,
    path = "/admin/events",
    responses((status = 200, description = "All events by date", body = [crate::models::EventRow])),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_events(
    State(state): State<AppState>,
    auth: BearerHeader,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    Ok(Json(state.backend.list_events(false, Some(&session.token)).await?))
}

#[utoipa::path(
    post,
    path = "/admin/events",
    request_body = EventDraft,
    responses(
        (status = 201, description = "Event added", body = crate::models::EventRow),
        (status = 400, description = "Title and date are required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_event(
    State(state): State<AppState>,
    auth: BearerHeader,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    validate_event(&draft)?;
    let created = state
        .backend
        .create_events(std::slice::from_ref(&draft), Some(&session.token))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("Create failed".into()))?;
    info!(id = %created.id, title = %created.title, "event added");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/admin/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventDraft,
    responses((status = 200, description = "Saved", body = crate::models::EventRow)),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_event(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    validate_event(&draft)?;
    let saved = state
        .backend
        .update_event(&id, &draft, Some(&session.token))
        .await?;
    Ok(Json(saved))
}

#[utoipa::path(
    delete,
    path = "/admin/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses((status = 204, description = "Deleted")),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    state.backend.delete_event(&id, Some(&session.token)).await?;
    info!(%id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admin/events/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Rows imported", body = ImportSummary),
        (status = 400, description = "Empty CSV or no valid rows")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn import_events(
    State(state): State<AppState>,
    auth: BearerHeader,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    let drafts = events_from_csv(&body)?;
    state
        .backend
        .create_events(&drafts, Some(&session.token))
        .await?;
    info!(count = drafts.len(), "imported events");
    Ok(Json(ImportSummary {
        imported: drafts.len(),
    }))
}

fn with_url(state: &AppState, row: crate::models::PhotoRow) -> Result<AdminPhoto, ApiError> {
    let url = state.backend.public_url(&row.path)?.to_string();
    Ok(AdminPhoto {
        id: row.id,
        path: row.path,
        alt: row.alt,
        order_index: row.order_index,
        published: row.published,
        url,
    })
}

#[utoipa::path(
    get,
    path = "/admin/photos",
    responses((status = 200, description = "All photos in display order", body = [AdminPhoto])),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_photos(
    State(state): State<AppState>,
    auth: BearerHeader,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    let photos = state
        .backend
        .list_photos(false, Some(&session.token))
        .await?
        .into_iter()
        .map(|row| with_url(&state, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(photos))
}

#[utoipa::path(
    post,
    path = "/admin/photos",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Uploaded", body = AdminPhoto),
        (status = 400, description = "Empty upload")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("Choose a file first".into()));
    }
    let path = object_path(query.filename.as_deref().unwrap_or_default());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    state
        .backend
        .upload_object(&path, body.to_vec(), content_type, Some(&session.token))
        .await?;

    let photo = NewPhoto {
        path: path.clone(),
        alt: query.alt.filter(|a| !a.is_empty()),
        order_index: query.order_index,
        published: true,
    };
    let row = match state.backend.create_photo(&photo, Some(&session.token)).await {
        Ok(row) => row,
        Err(err) => {
            if let Err(cleanup) = state
                .backend
                .remove_objects(&[path.clone()], Some(&session.token))
                .await
            {
                warn!(%path, error = %cleanup, "failed to remove orphaned upload");
            }
            return Err(err.into());
        }
    };
    info!(%path, "photo uploaded");
    Ok((StatusCode::CREATED, Json(with_url(&state, row)?)))
}

#[utoipa::path(
    put,
    path = "/admin/photos/{id}",
    params(("id" = String, Path, description = "Photo id")),
    request_body = PhotoUpdate,
    responses((status = 200, description = "Saved", body = AdminPhoto)),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_photo(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<String>,
    Json(update): Json<PhotoUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    let row = state
        .backend
        .update_photo(&id, &update, Some(&session.token))
        .await?;
    Ok(Json(with_url(&state, row)?))
}

#[utoipa::path(
    delete,
    path = "/admin/photos/{id}",
    params(("id" = String, Path, description = "Photo id")),
    responses((status = 204, description = "Deleted from table and storage")),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn delete_photo(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    state.backend.delete_photo(&id, Some(&session.token)).await?;
    info!(%id, "photo deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/documents",
    responses((status = 200, description = "All documents", body = [crate::models::DocumentRow])),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    auth: BearerHeader,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    Ok(Json(
        state
            .backend
            .list_documents(false, Some(&session.token))
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/admin/documents",
    request_body = DocumentDraft,
    responses(
        (status = 201, description = "Document added", body = crate::models::DocumentRow),
        (status = 400, description = "Title and URL are required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_document(
    State(state): State<AppState>,
    auth: BearerHeader,
    Json(draft): Json<DocumentDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    validate_document(&draft)?;
    let created = state
        .backend
        .create_document(&draft, Some(&session.token))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/admin/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    request_body = DocumentDraft,
    responses((status = 200, description = "Saved", body = crate::models::DocumentRow)),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_document(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<String>,
    Json(draft): Json<DocumentDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    validate_document(&draft)?;
    Ok(Json(
        state
            .backend
            .update_document(&id, &draft, Some(&session.token))
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/admin/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses((status = 204, description = "Deleted")),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = admin(&state, auth).await?;
    state
        .backend
        .delete_document(&id, Some(&session.token))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
