use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::announcements::build_announcements;
use crate::backend::BackendError;
use crate::error::ApiError;
use crate::filter::{filter_events, parse_calendars};
use crate::ical::ics_filename;
use crate::models::{
    Announcement, ContactInfo, DocumentRow, EventItem, GalleryImage, JoinRequest, JoinResponse,
    SitePayload,
};
use crate::validation::validate_join_request;
use crate::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventQuery {
    /// Comma separated calendars, e.g. `Band,Drama`. Defaults to all.
    pub calendars: Option<String>,
    /// Case-insensitive title search.
    pub q: Option<String>,
}

#[utoipa::path(get, path = "/", tag = "site")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Boosters Site API",
        "endpoints": {
            "/site": "Homepage payload: events, photos, documents, announcements, contact",
            "/events": "Published events as JSON (filter with calendars and q)",
            "/events.ics": "Download filtered events as an iCalendar file",
            "/events/{id}/ics": "Download one event as an iCalendar file",
            "/join-request": "Send a join request to the organization"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "site")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "site")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

pub(crate) async fn load_events(state: &AppState) -> Result<Vec<EventItem>, BackendError> {
    let rows = state.backend.list_events(true, None).await?;
    Ok(rows
        .into_iter()
        .filter(|r| r.published)
        .map(EventItem::from)
        .collect())
}

pub(crate) async fn load_gallery(state: &AppState) -> Result<Vec<GalleryImage>, BackendError> {
    let rows = state.backend.list_photos(true, None).await?;
    rows.into_iter()
        .filter(|r| r.published)
        .map(|r| -> Result<GalleryImage, BackendError> {
            Ok(GalleryImage {
                src: state.backend.public_url(&r.path)?.to_string(),
                alt: r.alt.filter(|a| !a.is_empty()).unwrap_or_else(|| "Photo".into()),
                id: r.id,
            })
        })
        .collect()
}

fn announcements_for(state: &AppState, events: &[EventItem]) -> Vec<Announcement> {
    let today = Utc::now().with_timezone(&state.tz).date_naive();
    build_announcements(
        &state.settings.static_announcements,
        events,
        today,
        state.settings.announcement_count,
    )
}

fn filtered(events: &[EventItem], query: &EventQuery) -> Result<Vec<EventItem>, ApiError> {
    let selected = parse_calendars(query.calendars.as_deref()).map_err(ApiError::BadRequest)?;
    Ok(filter_events(events, &selected, query.q.as_deref()))
}

fn calendar_download(filename: &str, body: String) -> impl IntoResponse + use<> {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

#[utoipa::path(
    get,
    path = "/site",
    responses((status = 200, description = "Homepage content", body = SitePayload)),
    tag = "site"
)]
pub async fn get_site(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (events, photos, documents) = futures::try_join!(
        load_events(&state),
        load_gallery(&state),
        state.backend.list_documents(true, None),
    )?;
    let documents: Vec<DocumentRow> = documents.into_iter().filter(|d| d.published).collect();
    let announcements = announcements_for(&state, &events);

    Ok(Json(SitePayload {
        events,
        photos,
        documents,
        announcements,
        contact: ContactInfo {
            organization: state.settings.organization_name.clone(),
            email: state.settings.contact_email.clone(),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/events",
    params(EventQuery),
    responses(
        (status = 200, description = "Matching published events", body = [EventItem]),
        (status = 400, description = "Unknown calendar")
    ),
    tag = "events"
)]
pub async fn get_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = load_events(&state).await?;
    Ok(Json(filtered(&events, &query)?))
}

#[utoipa::path(
    get,
    path = "/events.ics",
    params(EventQuery),
    responses(
        (status = 200, description = "iCalendar file", content_type = "text/calendar"),
        (status = 400, description = "Unknown calendar")
    ),
    tag = "events"
)]
pub async fn get_events_ics(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = load_events(&state).await?;
    let selected = filtered(&events, &query)?;
    let body = state.exporter.events_to_ics(&selected, Utc::now());
    Ok(calendar_download(&state.settings.calendar_file_name, body))
}

#[utoipa::path(
    get,
    path = "/events/{id}/ics",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "iCalendar file", content_type = "text/calendar"),
        (status = 404, description = "No such published event")
    ),
    tag = "events"
)]
pub async fn get_event_ics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.backend.get_event(&id, None).await?;
    if !row.published {
        return Err(ApiError::NotFound(format!("event {id} not found")));
    }
    let event = EventItem::from(row);
    let body = state.exporter.event_to_ics(&event, Utc::now());
    Ok(calendar_download(&ics_filename(&event.title), body))
}

#[utoipa::path(
    get,
    path = "/photos",
    responses((status = 200, description = "Published gallery images", body = [GalleryImage])),
    tag = "site"
)]
pub async fn get_photos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(load_gallery(&state).await?))
}

#[utoipa::path(
    get,
    path = "/documents",
    responses((status = 200, description = "Published documents", body = [DocumentRow])),
    tag = "site"
)]
pub async fn get_documents(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let documents: Vec<DocumentRow> = state
        .backend
        .list_documents(true, None)
        .await?
        .into_iter()
        .filter(|d| d.published)
        .collect();
    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/announcements",
    responses((status = 200, description = "Current announcements", body = [Announcement])),
    tag = "site"
)]
pub async fn get_announcements(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events = load_events(&state).await?;
    Ok(Json(announcements_for(&state, &events)))
}

#[utoipa::path(
    post,
    path = "/join-request",
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Email sent", body = JoinResponse),
        (status = 400, description = "Name and email are required"),
        (status = 500, description = "Email provider missing or failed")
    ),
    tag = "site"
)]
pub async fn join_request(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if !state.mailer.is_configured() {
        return Err(crate::mailer::MailError::MissingApiKey.into());
    }
    let request: JoinRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
    validate_join_request(&request)?;

    info!(email = %request.email, "join request received");
    let id = state.mailer.send_join_request(&request).await?;
    Ok(Json(JoinResponse { ok: true, id }))
}
