use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{delete, post};
use axum::{Extension, Json, Router};
use rest_types::{TimeEntryResultTO, TimeEntryTO};
use service::reporting::ReportingService;
use service::time_store::TimeStoreService;
use tracing::instrument;
use uuid::Uuid;

use crate::{error_handler, AuthenticatedUser, RestStateDef};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route("/", post(record_time_entry::<RestState>))
        .route("/{id}", delete(delete_time_entry::<RestState>))
}

#[instrument(skip(rest_state))]
pub async fn record_time_entry<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(entry): Json<TimeEntryTO>,
) -> Response {
    error_handler(
        (async {
            let stored = rest_state
                .time_store_service()
                .record_time_entry(user.user_id, entry.date, entry.hours)
                .await?;
            let month_overtime_hours = rest_state
                .reporting_service()
                .overtime_report(user.user_id, stored.date.year() as u32, Some(stored.date.month() as u8))
                .await?
                .summary_overtime;
            let result = TimeEntryResultTO {
                entry: TimeEntryTO::from(&stored),
                month_overtime_hours,
            };
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(serde_json::to_string(&result).unwrap()))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn delete_time_entry<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            rest_state
                .time_store_service()
                .delete_time_entry(id, &user.user_id.to_string())
                .await?;
            Ok(Response::builder().status(200).body(Body::empty()).unwrap())
        })
        .await,
    )
}
