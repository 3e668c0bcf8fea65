use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::DashboardResponse, app_state::AppState, auth::MemberUser,
    routes::ApiError,
};

use super::YearQuery;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Member dashboard; admins get the admin view instead.
#[instrument(name = "GET /dashboard", skip(user, app_state), fields(profile_id = %user.id))]
async fn dashboard(
    user: MemberUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .dashboard(&user.actor(), query.year())
        .await?;

    Ok(Json(dashboard.into()))
}
