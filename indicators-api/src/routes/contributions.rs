use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        ContributionDetailResponse, ContributionStatusResponse, ReportResponse,
    },
    app_state::AppState,
    auth::MemberUser,
    domain::models::ContributionId,
    routes::ApiError,
};

use super::{ReportRequest, YearQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contributions))
        .route("/:id", get(contribution_detail))
        .route("/:id/reports", post(create_report))
}

#[instrument(name = "GET /contributions", skip(user, app_state), fields(profile_id = %user.id))]
async fn list_contributions(
    user: MemberUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<ContributionStatusResponse>>, ApiError> {
    let contributions = app_state
        .reporting_service
        .list_contributions(&user.actor(), query.year())
        .await?;

    Ok(Json(contributions.into_iter().map(Into::into).collect()))
}

#[instrument(name = "GET /contributions/:id", skip(user, app_state), fields(profile_id = %user.id))]
async fn contribution_detail(
    user: MemberUser,
    State(app_state): State<AppState>,
    Path(id): Path<ContributionId>,
) -> Result<Json<ContributionDetailResponse>, ApiError> {
    let detail = app_state
        .reporting_service
        .contribution_detail(&user.actor(), &id)
        .await?;

    Ok(Json(detail.into()))
}

#[instrument(name = "POST /contributions/:id/reports", skip(user, app_state, body), fields(profile_id = %user.id))]
async fn create_report(
    user: MemberUser,
    State(app_state): State<AppState>,
    Path(id): Path<ContributionId>,
    Json(body): Json<ReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), ApiError> {
    let report = app_state
        .reporting_service
        .submit_contribution_report(&user.actor(), &id, body.try_into()?)
        .await?;

    Ok((StatusCode::CREATED, Json(report.into())))
}
