use std::collections::HashMap;

use async_trait::async_trait;
use progress_core::LatestState;

use crate::domain::{
    models::{
        ContributionId, EvidenceReport, NewProgressReport, OwnIndicatorId, ProgressReport,
        ReportTarget,
    },
    TrackingError,
};

/// Outbound port for the append-only report logs.
#[async_trait]
pub trait ReportRepository: Send + Sync + 'static {
    async fn append_report(
        &self,
        report: &NewProgressReport,
    ) -> Result<ProgressReport, TrackingError>;

    /// Every report of the target, newest first.
    async fn report_history(
        &self,
        target: &ReportTarget,
    ) -> Result<Vec<ProgressReport>, TrackingError>;

    /// Latest state of each contribution that has at least one report.
    async fn latest_contribution_states(
        &self,
        ids: &[ContributionId],
    ) -> Result<HashMap<ContributionId, LatestState<ContributionId>>, TrackingError>;

    async fn latest_own_states(
        &self,
        ids: &[OwnIndicatorId],
    ) -> Result<HashMap<OwnIndicatorId, LatestState<OwnIndicatorId>>, TrackingError>;

    /// Most recent contribution reports that carry evidence.
    async fn recent_evidence(&self, limit: usize) -> Result<Vec<EvidenceReport>, TrackingError>;
}
