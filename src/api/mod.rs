//! JSON surface the hosting webhook server uses to drive the solver.
pub mod payload;

use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::SharedState;
use crate::error::AppError;
use crate::solver::ChallengeAction;
use payload::{ChallengePayload, ChallengeResponse};

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/apis/{group}/{version}/{solver}", post(solve))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

async fn healthz() -> &'static str {
    "ok"
}

// POST /apis/{group}/v1alpha1/{solver}
pub async fn solve(
    Extension(state): Extension<SharedState>,
    Path((group, version, solver)): Path<(String, String, String)>,
    Json(payload): Json<ChallengePayload>,
) -> Result<Json<ChallengePayload>, AppError> {
    if group != state.config.group_name
        || version != payload::API_VERSION
        || solver != state.solver.name()
    {
        return Err(AppError::NotFound);
    }

    let Some(request) = payload.request else {
        return Err(AppError::bad_request("missing 'request'"));
    };
    let Some(action) = request.action else {
        return Err(AppError::bad_request("missing 'request.action'"));
    };

    let result = match action {
        ChallengeAction::Present => state.solver.present(&request).await,
        ChallengeAction::CleanUp => state.solver.clean_up(&request).await,
    };

    let response = match result {
        Ok(()) => ChallengeResponse::success(&request.uid),
        Err(err) => {
            warn!(uid = %request.uid, action = ?action, "challenge failed: {err}");
            ChallengeResponse::failure(&request.uid, &err)
        }
    };

    Ok(Json(ChallengePayload::reply(payload.api_version, response)))
}
