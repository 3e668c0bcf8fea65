use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        OwnIndicatorDetailResponse, OwnIndicatorResponse, OwnIndicatorStatusResponse,
        ReportResponse,
    },
    app_state::AppState,
    auth::MemberUser,
    domain::models::OwnIndicatorId,
    routes::ApiError,
};

use super::{IndicatorDraftRequest, ReportRequest, YearQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_indicators).post(create_own_indicators))
        .route("/:id", get(own_indicator_detail))
        .route("/:id/reports", post(create_report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOwnIndicatorsRequest {
    year: i32,
    items: Vec<IndicatorDraftRequest>,
}

#[instrument(name = "GET /own-indicators", skip(user, app_state), fields(profile_id = %user.id))]
async fn list_own_indicators(
    user: MemberUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<OwnIndicatorStatusResponse>>, ApiError> {
    let indicators = app_state
        .reporting_service
        .list_own_indicators(&user.actor(), query.year())
        .await?;

    Ok(Json(indicators.into_iter().map(Into::into).collect()))
}

#[instrument(name = "GET /own-indicators/:id", skip(user, app_state), fields(profile_id = %user.id))]
async fn own_indicator_detail(
    user: MemberUser,
    State(app_state): State<AppState>,
    Path(id): Path<OwnIndicatorId>,
) -> Result<Json<OwnIndicatorDetailResponse>, ApiError> {
    let detail = app_state
        .reporting_service
        .own_indicator_detail(&user.actor(), &id)
        .await?;

    Ok(Json(detail.into()))
}

#[instrument(name = "POST /own-indicators", skip(user, app_state, body), fields(profile_id = %user.id))]
async fn create_own_indicators(
    user: MemberUser,
    State(app_state): State<AppState>,
    Json(body): Json<CreateOwnIndicatorsRequest>,
) -> Result<(StatusCode, Json<Vec<OwnIndicatorResponse>>), ApiError> {
    let created = app_state
        .reporting_service
        .create_own_indicators(
            &user.actor(),
            body.year,
            body.items.into_iter().map(Into::into).collect(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(Into::into).collect()),
    ))
}

#[instrument(name = "POST /own-indicators/:id/reports", skip(user, app_state, body), fields(profile_id = %user.id))]
async fn create_report(
    user: MemberUser,
    State(app_state): State<AppState>,
    Path(id): Path<OwnIndicatorId>,
    Json(body): Json<ReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), ApiError> {
    let report = app_state
        .reporting_service
        .submit_own_report(&user.actor(), &id, body.try_into()?)
        .await?;

    Ok((StatusCode::CREATED, Json(report.into())))
}
