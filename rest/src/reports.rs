use axum::body::Body;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use rest_types::{OvertimeReportTO, ReportQueryTO};
use service::reporting::ReportingService;
use tracing::instrument;

use crate::{error_handler, AuthenticatedUser, RestStateDef};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new().route("/overtime", get(get_overtime_report::<RestState>))
}

#[instrument(skip(rest_state))]
pub async fn get_overtime_report<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<ReportQueryTO>,
) -> Response {
    error_handler(
        (async {
            let report = rest_state
                .reporting_service()
                .overtime_report(query.user, query.year, query.month)
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&OvertimeReportTO::from(&report)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}
