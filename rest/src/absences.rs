use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::post;
use axum::{Extension, Json, Router};
use rest_types::{AbsenceDecisionTO, AbsenceRequestTO, NewAbsenceRequestTO};
use service::absence::AbsenceService;
use tracing::instrument;
use uuid::Uuid;

use crate::{error_handler, AuthenticatedUser, RestStateDef};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route("/", post(request_absence::<RestState>))
        .route("/{id}/decision", post(decide_absence::<RestState>))
}

#[instrument(skip(rest_state))]
pub async fn request_absence<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(_user): Extension<AuthenticatedUser>,
    Json(new_request): Json<NewAbsenceRequestTO>,
) -> Response {
    error_handler(
        (async {
            let request = rest_state
                .absence_service()
                .request(
                    new_request.user_id,
                    new_request.absence_type.into(),
                    new_request.start_date,
                    new_request.end_date,
                    new_request.reason,
                )
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&AbsenceRequestTO::from(&request)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
pub async fn decide_absence<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(decision): Json<AbsenceDecisionTO>,
) -> Response {
    error_handler(
        (async {
            let decided_by = user.user_id.to_string();
            let request = rest_state
                .absence_service()
                .decide(id, decision.action.into(), &decided_by)
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&AbsenceRequestTO::from(&request)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}
