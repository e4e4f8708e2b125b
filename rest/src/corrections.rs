use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Extension, Json, Router};
use rest_types::{CorrectionTO, NewCorrectionTO};
use service::time_store::TimeStoreService;
use tracing::instrument;

use crate::{error_handler, AuthenticatedUser, RestStateDef};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new().route("/", post(create_correction::<RestState>))
}

/// Admin-only in principle (spec.md §6); authorization itself is the
/// transport shim's job and not enforced here.
#[instrument(skip(rest_state))]
pub async fn create_correction<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(new_correction): Json<NewCorrectionTO>,
) -> Response {
    error_handler(
        (async {
            let correction = rest_state
                .time_store_service()
                .record_correction(
                    new_correction.user_id,
                    new_correction.date,
                    new_correction.hours,
                    new_correction.reason,
                    std::sync::Arc::from(user.user_id.to_string().as_str()),
                )
                .await?;
            Ok(Response::builder()
                .status(200)
                .header("Content-Type", "application/json")
                .body(Body::new(
                    serde_json::to_string(&CorrectionTO::from(&correction)).unwrap(),
                ))
                .unwrap())
        })
        .await,
    )
}
