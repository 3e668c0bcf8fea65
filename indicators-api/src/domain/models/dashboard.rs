use progress_core::{AlertEntry, LatestState, MacroRollup, StatusSummary};

use super::{
    AreaContribution, ContributionId, EvidenceReport, MacroChallenge, OwnIndicator,
    OwnIndicatorId, ProgressReport,
};

/// A contribution with the latest state of its reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionStatus {
    pub contribution: AreaContribution,
    pub latest: Option<LatestState<ContributionId>>,
}

/// An own indicator with the latest state of its reports.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnIndicatorStatus {
    pub indicator: OwnIndicator,
    pub latest: Option<LatestState<OwnIndicatorId>>,
}

/// A contribution with its full report history, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionDetail {
    pub status: ContributionStatus,
    pub history: Vec<ProgressReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnIndicatorDetail {
    pub status: OwnIndicatorStatus,
    pub history: Vec<ProgressReport>,
}

/// Per-macro counters shown on the member dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSummary {
    pub macro_challenge: String,
    pub total: usize,
    pub risk: usize,
    pub completed: usize,
    pub no_updates: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberDashboard {
    pub year: i32,
    pub contributions: StatusSummary,
    pub own_indicators: StatusSummary,
    pub macros: Vec<MacroSummary>,
}

/// A macro roll-up along with the contributions it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroRollupDetail {
    pub rollup: MacroRollup<MacroChallenge>,
    pub contributions: Vec<ContributionStatus>,
}

pub type ContributionAlert = AlertEntry<AreaContribution, ContributionId>;
pub type OwnIndicatorAlert = AlertEntry<OwnIndicator, OwnIndicatorId>;

#[derive(Debug, Clone, PartialEq)]
pub struct AdminDashboard {
    pub year: i32,
    pub total_areas: usize,
    pub total_macros: usize,
    pub contributing_areas: usize,
    pub coverage_percent: u32,
    pub contributions: StatusSummary,
    pub own_indicators: StatusSummary,
    pub macros: Vec<MacroRollupDetail>,
    pub alerts: Vec<ContributionAlert>,
    pub own_alerts: Vec<OwnIndicatorAlert>,
    pub recent_evidence: Vec<EvidenceReport>,
}

/// Either view of the landing dashboard, depending on the caller's role.
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    Member(MemberDashboard),
    Admin(Box<AdminDashboard>),
}
