pub mod admin;
pub mod announcements;
pub mod auth;
pub mod backend;
pub mod csv_import;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod ical;
pub mod mailer;
pub mod models;
pub mod openapi;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderName, Method};
use axum::{
    Router,
    routing::{get, post, put},
};
use chrono_tz::Tz;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::backend::SupabaseClient;
use crate::error::StartupError;
use crate::ical::IcsExporter;
use crate::mailer::ResendMailer;
use crate::openapi::ApiDoc;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub tz: Tz,
    pub backend: Arc<SupabaseClient>,
    pub mailer: Arc<ResendMailer>,
    pub exporter: Arc<IcsExporter>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, StartupError> {
        let tz = settings.tz()?;
        let backend = SupabaseClient::new(
            settings.supabase_url.clone(),
            &settings.supabase_anon_key,
            &settings.storage_bucket,
        )?;
        let mailer = ResendMailer::new(
            settings.resend_base_url.clone(),
            settings.resend_api_key.as_deref(),
            &settings.join_request_from,
            &settings.join_request_to,
        )?;
        let exporter = IcsExporter::new(&settings.organization_name, &settings.uid_domain);
        Ok(Self {
            settings,
            tz,
            backend: Arc::new(backend),
            mailer: Arc::new(mailer),
            exporter: Arc::new(exporter),
        })
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState::new(settings)?;
    if !state.mailer.is_configured() {
        info!("RESEND_API_KEY not set; join requests will be rejected");
    }

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Boosters Site API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
        ])
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz/live", get(handlers::healthz_live))
        .route("/healthz/ready", get(handlers::healthz_ready))
        .route("/site", get(handlers::get_site))
        .route("/events", get(handlers::get_events))
        .route("/events.ics", get(handlers::get_events_ics))
        .route("/events/{id}/ics", get(handlers::get_event_ics))
        .route("/photos", get(handlers::get_photos))
        .route("/documents", get(handlers::get_documents))
        .route("/announcements", get(handlers::get_announcements))
        .route("/join-request", post(handlers::join_request))
        .layer(cors_layer());

    let admin_routes = Router::new()
        .route("/admin/login", post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/session", get(admin::session))
        .route("/admin/admins", get(admin::list_admins))
        .route(
            "/admin/events",
            get(admin::list_events).post(admin::create_event),
        )
        .route("/admin/events/import", post(admin::import_events))
        .route(
            "/admin/events/{id}",
            put(admin::update_event).delete(admin::delete_event),
        )
        .route(
            "/admin/photos",
            get(admin::list_photos).post(admin::upload_photo),
        )
        .route(
            "/admin/photos/{id}",
            put(admin::update_photo).delete(admin::delete_photo),
        )
        .route(
            "/admin/documents",
            get(admin::list_documents).post(admin::create_document),
        )
        .route(
            "/admin/documents/{id}",
            put(admin::update_document).delete(admin::delete_document),
        );

    let mut router = public.merge(admin_routes).with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer)
}
