use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        AdminDashboardResponse, AreaResponse, ContributionResponse, MacroResponse,
        OwnIndicatorDetailResponse, OwnIndicatorStatusResponse, ProfileResponse,
    },
    app_state::AppState,
    auth::AdminUser,
    domain::{
        models::{
            AreaDraft, AreaId, AreaUpdate, ContributionId, ContributionUpdate, Goal,
            IndicatorKind, MacroChallengeDraft, MacroId, NewContributionBatch, OwnIndicatorId,
            ProfileId,
        },
        Role,
    },
    repositories::ProfileRepository,
    routes::ApiError,
};

use super::{IndicatorDraftRequest, YearQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/areas", get(list_areas).post(create_area))
        .route("/areas/:id", put(update_area).delete(deactivate_area))
        .route("/macros", get(list_macros).post(create_macro))
        .route("/macros/:id", put(update_macro).delete(delete_macro))
        .route("/contributions", post(create_contributions))
        .route("/contributions/:id", put(update_contribution))
        .route("/contributions/:id/active", put(set_contribution_active))
        .route("/users", get(list_users))
        .route("/users/:id/approve", post(approve_user))
        .route("/users/:id/role", put(set_user_role))
        .route("/dashboard", get(admin_dashboard))
        .route("/own-indicators", get(list_own_indicators))
        .route("/own-indicators/:id", get(own_indicator_detail))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AreaRequest {
    name: String,
    kind: String,
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MacroRequest {
    year: i32,
    #[serde(default)]
    responsible_area: String,
    #[serde(default)]
    challenge: String,
    #[serde(default)]
    indicator: String,
    #[serde(default)]
    indicator_kind: IndicatorKind,
    goal_primary_value: Option<f64>,
    goal_primary_description: Option<String>,
    goal_secondary_value: Option<f64>,
    goal_secondary_description: Option<String>,
}

impl From<MacroRequest> for MacroChallengeDraft {
    fn from(request: MacroRequest) -> Self {
        MacroChallengeDraft {
            year: request.year,
            responsible_area: request.responsible_area,
            challenge: request.challenge,
            indicator: request.indicator,
            indicator_kind: request.indicator_kind,
            goal_primary: Goal {
                value: request.goal_primary_value,
                description: request.goal_primary_description,
            },
            goal_secondary: Goal {
                value: request.goal_secondary_value,
                description: request.goal_secondary_description,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateContributionsRequest {
    macro_id: MacroId,
    area_id: AreaId,
    year: i32,
    items: Vec<IndicatorDraftRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateContributionRequest {
    #[serde(flatten)]
    draft: IndicatorDraftRequest,
    ordinal: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ActiveRequest {
    active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveRequest {
    area_id: AreaId,
    #[serde(default = "default_approved_role")]
    role: Role,
}

fn default_approved_role() -> Role {
    Role::Member
}

#[derive(Debug, Deserialize)]
struct RoleRequest {
    role: Role,
}

#[instrument(name = "GET /admin/areas", skip(_admin, app_state))]
async fn list_areas(
    _admin: AdminUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<AreaResponse>>, ApiError> {
    let areas = app_state.administration_service.list_areas().await?;

    Ok(Json(areas.into_iter().map(Into::into).collect()))
}

#[instrument(name = "POST /admin/areas", skip(_admin, app_state))]
async fn create_area(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Json(body): Json<AreaRequest>,
) -> Result<(StatusCode, Json<AreaResponse>), ApiError> {
    let area = app_state
        .administration_service
        .create_area(AreaDraft {
            name: body.name,
            kind: body.kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(area.into())))
}

#[instrument(name = "PUT /admin/areas/:id", skip(_admin, app_state))]
async fn update_area(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<AreaId>,
    Json(body): Json<AreaRequest>,
) -> Result<Json<AreaResponse>, ApiError> {
    let area = app_state
        .administration_service
        .update_area(
            &id,
            AreaUpdate {
                name: body.name,
                kind: body.kind,
                active: body.active,
            },
        )
        .await?;

    Ok(Json(area.into()))
}

/// Areas are deactivated, never removed.
#[instrument(name = "DELETE /admin/areas/:id", skip(_admin, app_state))]
async fn deactivate_area(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<AreaId>,
) -> Result<StatusCode, ApiError> {
    app_state.administration_service.deactivate_area(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /admin/macros", skip(_admin, app_state))]
async fn list_macros(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MacroResponse>>, ApiError> {
    let macros = app_state
        .administration_service
        .list_macros(query.year())
        .await?;

    Ok(Json(macros.into_iter().map(Into::into).collect()))
}

#[instrument(name = "POST /admin/macros", skip(admin, app_state), fields(profile_id = %admin.id))]
async fn create_macro(
    admin: AdminUser,
    State(app_state): State<AppState>,
    Json(body): Json<MacroRequest>,
) -> Result<(StatusCode, Json<MacroResponse>), ApiError> {
    let created = app_state
        .administration_service
        .create_macro(&admin.actor(), body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(name = "PUT /admin/macros/:id", skip(_admin, app_state))]
async fn update_macro(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<MacroId>,
    Json(body): Json<MacroRequest>,
) -> Result<Json<MacroResponse>, ApiError> {
    let updated = app_state
        .administration_service
        .update_macro(&id, body.into())
        .await?;

    Ok(Json(updated.into()))
}

#[instrument(name = "DELETE /admin/macros/:id", skip(_admin, app_state))]
async fn delete_macro(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<MacroId>,
) -> Result<StatusCode, ApiError> {
    app_state.administration_service.delete_macro(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "POST /admin/contributions", skip(admin, app_state, body), fields(profile_id = %admin.id))]
async fn create_contributions(
    admin: AdminUser,
    State(app_state): State<AppState>,
    Json(body): Json<CreateContributionsRequest>,
) -> Result<(StatusCode, Json<Vec<ContributionResponse>>), ApiError> {
    let batch = NewContributionBatch {
        macro_id: body.macro_id,
        area_id: body.area_id,
        year: body.year,
        items: body.items.into_iter().map(Into::into).collect(),
        created_by: Some(admin.id),
    };

    let created = app_state
        .administration_service
        .create_contributions(batch)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(created.into_iter().map(Into::into).collect()),
    ))
}

#[instrument(name = "PUT /admin/contributions/:id", skip(_admin, app_state))]
async fn update_contribution(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<ContributionId>,
    Json(body): Json<UpdateContributionRequest>,
) -> Result<Json<ContributionResponse>, ApiError> {
    let updated = app_state
        .administration_service
        .update_contribution(
            &id,
            ContributionUpdate {
                draft: body.draft.into(),
                ordinal: body.ordinal,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

#[instrument(name = "PUT /admin/contributions/:id/active", skip(_admin, app_state))]
async fn set_contribution_active(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<ContributionId>,
    Json(body): Json<ActiveRequest>,
) -> Result<StatusCode, ApiError> {
    app_state
        .administration_service
        .set_contribution_active(&id, body.active)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /admin/users", skip(_admin, app_state))]
async fn list_users(
    _admin: AdminUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    let profiles = app_state.profile_repo.list_profiles().await?;

    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

/// Link a profile to an area and grant it a role. Linking an area the
/// profile already has is not an error.
#[instrument(name = "POST /admin/users/:id/approve", skip(_admin, app_state))]
async fn approve_user(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ApproveRequest>,
) -> Result<StatusCode, ApiError> {
    if !body.role.is_approved() {
        return Err(ApiError::bad_request("approval needs the member or admin role"));
    }

    let area_exists = app_state
        .administration_service
        .list_areas()
        .await?
        .iter()
        .any(|area| area.id == body.area_id && area.active);
    if !area_exists {
        return Err(ApiError::bad_request("area does not exist or is inactive"));
    }

    let profile = app_state
        .profile_repo
        .approve(ProfileId::new(id), body.area_id, body.role)
        .await?;
    tracing::info!(profile_id = %profile.id, role = %profile.role, "profile approved");

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "PUT /admin/users/:id/role", skip(_admin, app_state))]
async fn set_user_role(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<RoleRequest>,
) -> Result<StatusCode, ApiError> {
    app_state
        .profile_repo
        .set_role(ProfileId::new(id), body.role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /admin/dashboard", skip(_admin, app_state))]
async fn admin_dashboard(
    _admin: AdminUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<AdminDashboardResponse>, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .admin_dashboard(query.year())
        .await?;

    Ok(Json(dashboard.into()))
}

#[instrument(name = "GET /admin/own-indicators", skip(admin, app_state))]
async fn list_own_indicators(
    admin: AdminUser,
    State(app_state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<OwnIndicatorStatusResponse>>, ApiError> {
    let indicators = app_state
        .reporting_service
        .list_own_indicators(&admin.actor(), query.year())
        .await?;

    Ok(Json(indicators.into_iter().map(Into::into).collect()))
}

#[instrument(name = "GET /admin/own-indicators/:id", skip(admin, app_state))]
async fn own_indicator_detail(
    admin: AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<OwnIndicatorId>,
) -> Result<Json<OwnIndicatorDetailResponse>, ApiError> {
    let detail = app_state
        .reporting_service
        .own_indicator_detail(&admin.actor(), &id)
        .await?;

    Ok(Json(detail.into()))
}
