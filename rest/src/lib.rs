pub mod absences;
pub mod corrections;
pub mod reports;
pub mod time_entries;
pub mod ws;

use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use serde_json::json;
use service::{
    absence::AbsenceService, event_bus::EventBusService, journal::JournalService,
    reporting::ReportingService, time_store::TimeStoreService, vacation::VacationService, ServiceError,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Everything a handler needs from the wiring layer. One associated type per
/// service, mirroring the `Deps` traits `service-impl` generates, so the
/// binary crate only has to name concrete types once.
pub trait RestStateDef: Clone + Send + Sync + 'static {
    type TimeStoreService: TimeStoreService + Send + Sync + 'static;
    type AbsenceService: AbsenceService + Send + Sync + 'static;
    type VacationService: VacationService + Send + Sync + 'static;
    type JournalService: JournalService + Send + Sync + 'static;
    type ReportingService: ReportingService + Send + Sync + 'static;
    type EventBusService: EventBusService + 'static;

    fn time_store_service(&self) -> Arc<Self::TimeStoreService>;
    fn absence_service(&self) -> Arc<Self::AbsenceService>;
    fn vacation_service(&self) -> Arc<Self::VacationService>;
    fn journal_service(&self) -> Arc<Self::JournalService>;
    fn reporting_service(&self) -> Arc<Self::ReportingService>;
    fn event_bus_service(&self) -> Arc<Self::EventBusService>;
}

/// Populated by the transport shim once a credential has been verified.
/// Authentication itself (spec.md §1 non-goal) is never implemented here.
#[derive(Clone, Copy, Debug)]
pub struct AuthenticatedUser {
    pub user_id: uuid::Uuid,
}

/// Maps the spec.md §7 error taxonomy onto HTTP status codes. Every handler
/// funnels its `Result<Response, ServiceError>` through this single place so
/// the mapping can never drift between resources.
pub(crate) fn error_handler(result: Result<Response, ServiceError>) -> Response {
    match result {
        Ok(response) => response,
        Err(error) => {
            let status = match &error {
                ServiceError::InvalidInput(_) => 400,
                ServiceError::PreconditionFailed(_) => 412,
                ServiceError::NotFound(_) => 404,
                ServiceError::Conflict(_) => 409,
                ServiceError::Inconsistent { .. } => 409,
                ServiceError::Transient => 503,
                ServiceError::DatabaseQueryError(_) => 500,
            };
            tracing::warn!(%error, status, "request failed");
            Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(Body::new(json!({ "error": error.to_string() }).to_string()))
                .unwrap()
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "TimeEntries", description = "Worked-hours entry"),
        (name = "Absences", description = "Absence requests and decisions"),
        (name = "Corrections", description = "Admin overtime corrections"),
        (name = "Reports", description = "Overtime reporting")
    )
)]
struct ApiDoc;

pub fn router<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .nest("/time-entries", time_entries::generate_route::<RestState>())
        .nest("/absences", absences::generate_route::<RestState>())
        .nest("/overtime-corrections", corrections::generate_route::<RestState>())
        .nest("/reports", reports::generate_route::<RestState>())
        .nest("/ws", ws::generate_route::<RestState>())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

pub async fn start_server<RestState: RestStateDef>(state: RestState, bind_addr: &str) {
    let app = router::<RestState>().with_state(state);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("could not bind server");
    tracing::info!(bind_addr, "overtime engine listening");
    axum::serve(listener, app).await.expect("server crashed");
}
