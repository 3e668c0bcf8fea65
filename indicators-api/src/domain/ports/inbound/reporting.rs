use async_trait::async_trait;

use crate::domain::{
    models::{
        ContributionDetail, ContributionId, ContributionStatus, IndicatorDraft, OwnIndicator,
        OwnIndicatorDetail, OwnIndicatorId, OwnIndicatorStatus, ProgressReport, SubmitReport,
    },
    Actor, TrackingError,
};

/// Member-facing operations on contributions, own indicators and their reports.
///
/// Members see the indicators of the areas they are linked to; admins see all.
#[async_trait]
pub trait ReportingService: Send + Sync + 'static {
    async fn list_contributions(
        &self,
        actor: &Actor,
        year: i32,
    ) -> Result<Vec<ContributionStatus>, TrackingError>;

    async fn contribution_detail(
        &self,
        actor: &Actor,
        id: &ContributionId,
    ) -> Result<ContributionDetail, TrackingError>;

    /// Evaluate the report against the contribution's target and append it.
    async fn submit_contribution_report(
        &self,
        actor: &Actor,
        id: &ContributionId,
        report: SubmitReport,
    ) -> Result<ProgressReport, TrackingError>;

    async fn list_own_indicators(
        &self,
        actor: &Actor,
        year: i32,
    ) -> Result<Vec<OwnIndicatorStatus>, TrackingError>;

    async fn own_indicator_detail(
        &self,
        actor: &Actor,
        id: &OwnIndicatorId,
    ) -> Result<OwnIndicatorDetail, TrackingError>;

    /// Create own indicators in the actor's primary area.
    async fn create_own_indicators(
        &self,
        actor: &Actor,
        year: i32,
        items: Vec<IndicatorDraft>,
    ) -> Result<Vec<OwnIndicator>, TrackingError>;

    async fn submit_own_report(
        &self,
        actor: &Actor,
        id: &OwnIndicatorId,
        report: SubmitReport,
    ) -> Result<ProgressReport, TrackingError>;
}
