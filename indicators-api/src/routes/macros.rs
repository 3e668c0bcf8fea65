use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::MacroRollupResponse, app_state::AppState, auth::MemberUser,
    routes::ApiError,
};

use super::YearQuery;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(macro_rollups))
}

#[instrument(name = "GET /macros", skip(_user, app_state))]
async fn macro_rollups(
    _user: MemberUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MacroRollupResponse>>, ApiError> {
    let rollups = app_state
        .dashboard_service
        .macro_rollups(query.year())
        .await?;

    Ok(Json(rollups.into_iter().map(Into::into).collect()))
}
