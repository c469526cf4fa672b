use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::admin::{Ack, ImportSummary, LoginRequest};
use crate::auth::AdminSession;
use crate::models::{
    AdminEmail, AdminPhoto, Announcement, CalendarType, ContactInfo, DocumentDraft, DocumentRow,
    EventDraft, EventItem, EventRow, GalleryImage, JoinRequest, JoinResponse, PhotoRow,
    PhotoUpdate, SitePayload,
};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_site,
        crate::handlers::get_events,
        crate::handlers::get_events_ics,
        crate::handlers::get_event_ics,
        crate::handlers::get_photos,
        crate::handlers::get_documents,
        crate::handlers::get_announcements,
        crate::handlers::join_request,
        crate::admin::login,
        crate::admin::logout,
        crate::admin::session,
        crate::admin::list_admins,
        crate::admin::list_events,
        crate::admin::create_event,
        crate::admin::update_event,
        crate::admin::delete_event,
        crate::admin::import_events,
        crate::admin::list_photos,
        crate::admin::upload_photo,
        crate::admin::update_photo,
        crate::admin::delete_photo,
        crate::admin::list_documents,
        crate::admin::create_document,
        crate::admin::update_document,
        crate::admin::delete_document
    ),
    components(schemas(
        CalendarType,
        EventItem,
        EventRow,
        EventDraft,
        PhotoRow,
        PhotoUpdate,
        AdminPhoto,
        GalleryImage,
        DocumentRow,
        DocumentDraft,
        Announcement,
        AdminEmail,
        JoinRequest,
        JoinResponse,
        ContactInfo,
        SitePayload,
        AdminSession,
        LoginRequest,
        Ack,
        ImportSummary
    )),
    tags(
        (name = "site", description = "Public website content"),
        (name = "events", description = "Event listing and calendar export"),
        (name = "admin", description = "Admin dashboard operations")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
