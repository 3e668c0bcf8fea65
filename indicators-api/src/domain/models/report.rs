use progress_core::{EvaluatedReport, LatestState, ReportRecord, TrafficLight};
use time::{Date, OffsetDateTime};

use super::{ContributionId, OwnIndicatorId, ProfileId, ReportId};

/// What a progress report is filed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportTarget {
    Contribution(ContributionId),
    OwnIndicator(OwnIndicatorId),
}

/// An appended, immutable progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub id: ReportId,
    pub target: ReportTarget,
    pub report_date: Date,
    pub percent: f64,
    pub current_value: Option<f64>,
    pub traffic_light: TrafficLight,
    pub comment: String,
    pub evidence_path: Option<String>,
    pub created_by: Option<ProfileId>,
    pub created_at: OffsetDateTime,
}

impl ReportRecord for ProgressReport {
    type TargetId = ReportTarget;
    type ReportId = ReportId;

    fn target_id(&self) -> &ReportTarget {
        &self.target
    }

    fn report_id(&self) -> ReportId {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn latest_state(&self) -> LatestState<ReportTarget> {
        let state = LatestState::new(self.target)
            .with_percent(self.percent)
            .with_traffic_light(self.traffic_light)
            .with_period_end(self.report_date);

        match self.current_value {
            Some(value) => state.with_current_value(value),
            None => state,
        }
    }
}

/// A report as submitted by a member, before evaluation.
#[derive(Debug, Clone)]
pub struct SubmitReport {
    pub report_date: Date,
    pub current_value: Option<f64>,
    pub percent: Option<f64>,
    pub traffic_light: Option<TrafficLight>,
    pub comment: String,
    pub evidence_path: Option<String>,
}

/// An evaluated report ready to be appended.
#[derive(Debug, Clone)]
pub struct NewProgressReport {
    pub id: ReportId,
    pub target: ReportTarget,
    pub report_date: Date,
    pub evaluated: EvaluatedReport,
    pub evidence_path: Option<String>,
    pub created_by: Option<ProfileId>,
}

/// A recent report that carries evidence, with its contribution context.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceReport {
    pub report_id: ReportId,
    pub contribution_id: ContributionId,
    pub evidence_path: String,
    pub traffic_light: TrafficLight,
    pub created_at: OffsetDateTime,
    pub indicator: Option<String>,
    pub area_name: Option<String>,
    pub macro_challenge: Option<String>,
}
