use async_trait::async_trait;

use crate::domain::{
    models::{
        AreaContribution, ContributionId, ContributionUpdate, IndicatorFilter,
        NewContributionBatch, NewOwnIndicatorBatch, OwnIndicator, OwnIndicatorId,
    },
    TrackingError,
};

/// Outbound port for area contributions and own indicators.
///
/// Batch creation allocates ordinals: the rows of a batch get
/// `max + 1 ..= max + n` of their group, where `max` is read under a lock
/// held for the whole insert.
#[async_trait]
pub trait IndicatorRepository: Send + Sync + 'static {
    /// Contributions matching the filter, ordered by macro, area and ordinal.
    async fn list_contributions(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<AreaContribution>, TrackingError>;

    async fn get_contribution(
        &self,
        id: &ContributionId,
    ) -> Result<Option<AreaContribution>, TrackingError>;

    async fn create_contributions(
        &self,
        batch: &NewContributionBatch,
    ) -> Result<Vec<AreaContribution>, TrackingError>;

    async fn update_contribution(
        &self,
        id: &ContributionId,
        update: &ContributionUpdate,
    ) -> Result<AreaContribution, TrackingError>;

    async fn set_contribution_active(
        &self,
        id: &ContributionId,
        active: bool,
    ) -> Result<(), TrackingError>;

    /// Own indicators matching the filter; `macro_id` is ignored.
    async fn list_own_indicators(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<OwnIndicator>, TrackingError>;

    async fn get_own_indicator(
        &self,
        id: &OwnIndicatorId,
    ) -> Result<Option<OwnIndicator>, TrackingError>;

    async fn create_own_indicators(
        &self,
        batch: &NewOwnIndicatorBatch,
    ) -> Result<Vec<OwnIndicator>, TrackingError>;
}
