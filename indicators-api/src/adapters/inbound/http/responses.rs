//! HTTP response types for the indicator endpoints.
//!
//! These types serialize to the JSON format expected by the frontend.

use progress_core::{AlertEntry, LatestState, StatusSummary, TrafficLight};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::domain::{
    models::{
        AdminDashboard, Area, AreaContribution, AreaId, AreaRef, ContributionDetail,
        ContributionId, ContributionStatus, Dashboard, EvidenceReport, Goal, IndicatorKind,
        MacroChallenge, MacroId, MacroRollupDetail, MacroSummary, MemberDashboard, OwnIndicator,
        OwnIndicatorDetail, OwnIndicatorId, OwnIndicatorStatus, ProfileId, ProgressReport,
        ReportId, ReportTarget,
    },
    Profile, ProfileWithAreas, Role,
};

/// Dates go over the wire as `YYYY-MM-DD`.
fn iso_date(date: Date) -> String {
    date.to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRefResponse {
    pub id: AreaId,
    pub name: String,
    pub kind: String,
}

impl From<AreaRef> for AreaRefResponse {
    fn from(area: AreaRef) -> Self {
        Self {
            id: area.id,
            name: area.name,
            kind: area.kind,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaResponse {
    pub id: AreaId,
    pub name: String,
    pub kind: String,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Area> for AreaResponse {
    fn from(area: Area) -> Self {
        Self {
            id: area.id,
            name: area.name,
            kind: area.kind,
            active: area.active,
            created_at: area.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub value: Option<f64>,
    pub description: Option<String>,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        Self {
            value: goal.value,
            description: goal.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroResponse {
    pub id: MacroId,
    pub year: i32,
    pub responsible_area: String,
    pub challenge: String,
    pub indicator: String,
    pub indicator_kind: IndicatorKind,
    pub goal_primary: GoalResponse,
    pub goal_secondary: GoalResponse,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<MacroChallenge> for MacroResponse {
    fn from(m: MacroChallenge) -> Self {
        Self {
            id: m.id,
            year: m.year,
            responsible_area: m.responsible_area,
            challenge: m.challenge,
            indicator: m.indicator,
            indicator_kind: m.indicator_kind,
            goal_primary: m.goal_primary.into(),
            goal_secondary: m.goal_secondary.into(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionResponse {
    pub id: ContributionId,
    pub macro_id: MacroId,
    pub area_id: AreaId,
    pub year: i32,
    pub ordinal: i32,
    pub challenge: String,
    pub indicator: String,
    pub target_value: Option<f64>,
    pub target_description: Option<String>,
    pub active: bool,
    pub area: Option<AreaRefResponse>,
    pub macro_challenge: Option<String>,
}

impl From<AreaContribution> for ContributionResponse {
    fn from(c: AreaContribution) -> Self {
        Self {
            id: c.id,
            macro_id: c.macro_id,
            area_id: c.area_id,
            year: c.year,
            ordinal: c.ordinal,
            challenge: c.challenge,
            indicator: c.indicator,
            target_value: c.target_value,
            target_description: c.target_description,
            active: c.active,
            area: c.area.map(Into::into),
            macro_challenge: c.macro_challenge,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnIndicatorResponse {
    pub id: OwnIndicatorId,
    pub area_id: AreaId,
    pub year: i32,
    pub ordinal: i32,
    pub challenge: String,
    pub indicator: String,
    pub target_value: Option<f64>,
    pub target_description: Option<String>,
    pub active: bool,
    pub area: Option<AreaRefResponse>,
}

impl From<OwnIndicator> for OwnIndicatorResponse {
    fn from(o: OwnIndicator) -> Self {
        Self {
            id: o.id,
            area_id: o.area_id,
            year: o.year,
            ordinal: o.ordinal,
            challenge: o.challenge,
            indicator: o.indicator,
            target_value: o.target_value,
            target_description: o.target_description,
            active: o.active,
            area: o.area.map(Into::into),
        }
    }
}

/// Latest reported state of an indicator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestStateResponse {
    pub percent: Option<f64>,
    pub traffic_light: Option<TrafficLight>,
    pub period_end: Option<String>,
    pub current_value: Option<f64>,
}

impl<K> From<LatestState<K>> for LatestStateResponse {
    fn from(state: LatestState<K>) -> Self {
        Self {
            percent: state.percent,
            traffic_light: state.traffic_light,
            period_end: state.period_end.map(iso_date),
            current_value: state.current_value,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionStatusResponse {
    #[serde(flatten)]
    pub contribution: ContributionResponse,
    pub latest: Option<LatestStateResponse>,
}

impl From<ContributionStatus> for ContributionStatusResponse {
    fn from(status: ContributionStatus) -> Self {
        Self {
            contribution: status.contribution.into(),
            latest: status.latest.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnIndicatorStatusResponse {
    #[serde(flatten)]
    pub indicator: OwnIndicatorResponse,
    pub latest: Option<LatestStateResponse>,
}

impl From<OwnIndicatorStatus> for OwnIndicatorStatusResponse {
    fn from(status: OwnIndicatorStatus) -> Self {
        Self {
            indicator: status.indicator.into(),
            latest: status.latest.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: ReportId,
    pub contribution_id: Option<ContributionId>,
    pub indicator_id: Option<OwnIndicatorId>,
    pub report_date: String,
    pub percent: f64,
    pub current_value: Option<f64>,
    pub traffic_light: TrafficLight,
    pub comment: String,
    pub evidence_path: Option<String>,
    pub created_by: Option<ProfileId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ProgressReport> for ReportResponse {
    fn from(report: ProgressReport) -> Self {
        let (contribution_id, indicator_id) = match report.target {
            ReportTarget::Contribution(id) => (Some(id), None),
            ReportTarget::OwnIndicator(id) => (None, Some(id)),
        };
        Self {
            id: report.id,
            contribution_id,
            indicator_id,
            report_date: iso_date(report.report_date),
            percent: report.percent,
            current_value: report.current_value,
            traffic_light: report.traffic_light,
            comment: report.comment,
            evidence_path: report.evidence_path,
            created_by: report.created_by,
            created_at: report.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDetailResponse {
    pub contribution: ContributionStatusResponse,
    pub history: Vec<ReportResponse>,
}

impl From<ContributionDetail> for ContributionDetailResponse {
    fn from(detail: ContributionDetail) -> Self {
        Self {
            contribution: detail.status.into(),
            history: detail.history.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnIndicatorDetailResponse {
    pub indicator: OwnIndicatorStatusResponse,
    pub history: Vec<ReportResponse>,
}

impl From<OwnIndicatorDetail> for OwnIndicatorDetailResponse {
    fn from(detail: OwnIndicatorDetail) -> Self {
        Self {
            indicator: detail.status.into(),
            history: detail.history.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroSummaryResponse {
    pub macro_challenge: String,
    pub total: usize,
    pub risk: usize,
    pub completed: usize,
    pub no_updates: usize,
}

impl From<MacroSummary> for MacroSummaryResponse {
    fn from(summary: MacroSummary) -> Self {
        Self {
            macro_challenge: summary.macro_challenge,
            total: summary.total,
            risk: summary.risk,
            completed: summary.completed,
            no_updates: summary.no_updates,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroRollupResponse {
    #[serde(rename = "macro")]
    pub macro_challenge: MacroResponse,
    pub contributions_count: usize,
    pub contributing_areas_count: usize,
    pub missing_areas_count: usize,
    pub with_updates_count: usize,
    pub completed_count: usize,
    pub risk_count: usize,
    pub average_percent: Option<f64>,
    pub macro_percent_strict: Option<f64>,
    pub macro_traffic_light: Option<TrafficLight>,
    pub contributions: Vec<ContributionStatusResponse>,
}

impl From<MacroRollupDetail> for MacroRollupResponse {
    fn from(detail: MacroRollupDetail) -> Self {
        let rollup = detail.rollup;
        Self {
            macro_challenge: rollup.macro_challenge.into(),
            contributions_count: rollup.contributions_count,
            contributing_areas_count: rollup.contributing_areas_count,
            missing_areas_count: rollup.missing_areas_count,
            with_updates_count: rollup.with_updates_count,
            completed_count: rollup.completed_count,
            risk_count: rollup.risk_count,
            average_percent: rollup.average_percent,
            macro_percent_strict: rollup.macro_percent_strict,
            macro_traffic_light: rollup.macro_traffic_light,
            contributions: detail.contributions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse<T> {
    pub item: T,
    pub severity: TrafficLight,
    pub latest: LatestStateResponse,
}

impl<T, K, R> From<AlertEntry<T, K>> for AlertResponse<R>
where
    R: From<T>,
{
    fn from(alert: AlertEntry<T, K>) -> Self {
        Self {
            item: alert.item.into(),
            severity: alert.severity,
            latest: alert.latest.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceReportResponse {
    pub report_id: ReportId,
    pub contribution_id: ContributionId,
    pub evidence_path: String,
    pub traffic_light: TrafficLight,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub indicator: Option<String>,
    pub area_name: Option<String>,
    pub macro_challenge: Option<String>,
}

impl From<EvidenceReport> for EvidenceReportResponse {
    fn from(report: EvidenceReport) -> Self {
        Self {
            report_id: report.report_id,
            contribution_id: report.contribution_id,
            evidence_path: report.evidence_path,
            traffic_light: report.traffic_light,
            created_at: report.created_at,
            indicator: report.indicator,
            area_name: report.area_name,
            macro_challenge: report.macro_challenge,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDashboardResponse {
    pub year: i32,
    pub contributions: StatusSummary,
    pub own_indicators: StatusSummary,
    pub macros: Vec<MacroSummaryResponse>,
}

impl From<MemberDashboard> for MemberDashboardResponse {
    fn from(dashboard: MemberDashboard) -> Self {
        Self {
            year: dashboard.year,
            contributions: dashboard.contributions,
            own_indicators: dashboard.own_indicators,
            macros: dashboard.macros.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardResponse {
    pub year: i32,
    pub total_areas: usize,
    pub total_macros: usize,
    pub contributing_areas: usize,
    pub coverage_percent: u32,
    pub contributions: StatusSummary,
    pub own_indicators: StatusSummary,
    pub macros: Vec<MacroRollupResponse>,
    pub alerts: Vec<AlertResponse<ContributionResponse>>,
    pub own_alerts: Vec<AlertResponse<OwnIndicatorResponse>>,
    pub recent_evidence: Vec<EvidenceReportResponse>,
}

impl From<AdminDashboard> for AdminDashboardResponse {
    fn from(dashboard: AdminDashboard) -> Self {
        Self {
            year: dashboard.year,
            total_areas: dashboard.total_areas,
            total_macros: dashboard.total_macros,
            contributing_areas: dashboard.contributing_areas,
            coverage_percent: dashboard.coverage_percent,
            contributions: dashboard.contributions,
            own_indicators: dashboard.own_indicators,
            macros: dashboard.macros.into_iter().map(Into::into).collect(),
            alerts: dashboard.alerts.into_iter().map(Into::into).collect(),
            own_alerts: dashboard.own_alerts.into_iter().map(Into::into).collect(),
            recent_evidence: dashboard
                .recent_evidence
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// The landing dashboard, tagged with the view that was built.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum DashboardResponse {
    Member(MemberDashboardResponse),
    Admin(Box<AdminDashboardResponse>),
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        match dashboard {
            Dashboard::Member(member) => Self::Member(member.into()),
            Dashboard::Admin(admin) => Self::Admin(Box::new((*admin).into())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub primary_area: Option<AreaRefResponse>,
    pub areas: Vec<AreaRefResponse>,
}

impl From<ProfileWithAreas> for ProfileResponse {
    fn from(p: ProfileWithAreas) -> Self {
        Self {
            id: p.profile.id,
            email: p.profile.email,
            full_name: p.profile.full_name,
            role: p.profile.role,
            primary_area: p.primary_area.map(Into::into),
            areas: p.areas.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response for `GET /me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub pending_approval: bool,
    pub primary_area: Option<AreaRefResponse>,
}

impl MeResponse {
    pub fn new(profile: Profile, primary_area: Option<AreaRef>) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            pending_approval: !profile.role.is_approved(),
            role: profile.role,
            primary_area: primary_area.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceUploadResponse {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn report(target: ReportTarget) -> ProgressReport {
        ProgressReport {
            id: ReportId::new(Uuid::nil()),
            target,
            report_date: date!(2025 - 03 - 31),
            percent: 42.5,
            current_value: Some(17.0),
            traffic_light: TrafficLight::Amber,
            comment: "on track".to_string(),
            evidence_path: None,
            created_by: Some(ProfileId::new(3)),
            created_at: datetime!(2025-04-01 10:00 UTC),
        }
    }

    #[test]
    fn report_serializes_dates_for_the_frontend() {
        let target = ReportTarget::Contribution(ContributionId::new(Uuid::nil()));
        let value = serde_json::to_value(ReportResponse::from(report(target))).unwrap();

        assert_eq!(value["reportDate"], json!("2025-03-31"));
        assert_eq!(value["createdAt"], json!("2025-04-01T10:00:00Z"));
        assert_eq!(value["trafficLight"], json!("amber"));
        assert_eq!(value["contributionId"], json!(Uuid::nil().to_string()));
        assert!(value["indicatorId"].is_null());
    }

    #[test]
    fn own_indicator_report_names_its_indicator() {
        let target = ReportTarget::OwnIndicator(OwnIndicatorId::new(Uuid::nil()));
        let value = serde_json::to_value(ReportResponse::from(report(target))).unwrap();

        assert!(value["contributionId"].is_null());
        assert_eq!(value["indicatorId"], json!(Uuid::nil().to_string()));
    }

    #[test]
    fn latest_state_without_reports_is_all_null() {
        let value =
            serde_json::to_value(LatestStateResponse::from(LatestState::new(1_u8))).unwrap();

        assert_eq!(
            value,
            json!({
                "percent": null,
                "trafficLight": null,
                "periodEnd": null,
                "currentValue": null,
            })
        );
    }

    #[test]
    fn member_dashboard_is_tagged() {
        let dashboard = Dashboard::Member(MemberDashboard {
            year: 2025,
            contributions: StatusSummary::default(),
            own_indicators: StatusSummary::default(),
            macros: vec![],
        });

        let value = serde_json::to_value(DashboardResponse::from(dashboard)).unwrap();

        assert_eq!(value["view"], json!("member"));
        assert_eq!(value["year"], json!(2025));
        assert_eq!(value["contributions"]["withUpdates"], json!(0));
    }

    #[test]
    fn pending_profile_awaits_approval() {
        let profile = Profile {
            id: ProfileId::new(9),
            email: "new@example.org".to_string(),
            full_name: "New".to_string(),
            role: Role::Pending,
            access_token: String::new(),
        };

        let value = serde_json::to_value(MeResponse::new(profile, None)).unwrap();

        assert_eq!(value["pendingApproval"], json!(true));
        assert_eq!(value["role"], json!("pending"));
        assert!(value["primaryArea"].is_null());
    }
}
