use async_trait::async_trait;

use crate::domain::{
    models::{
        Area, AreaContribution, AreaDraft, AreaId, AreaUpdate, ContributionId,
        ContributionUpdate, MacroChallenge, MacroChallengeDraft, MacroId, NewContributionBatch,
    },
    Actor, TrackingError,
};

/// Admin maintenance of areas, macro challenges and contributions.
#[async_trait]
pub trait AdministrationService: Send + Sync + 'static {
    async fn list_areas(&self) -> Result<Vec<Area>, TrackingError>;
    async fn create_area(&self, draft: AreaDraft) -> Result<Area, TrackingError>;
    async fn update_area(&self, id: &AreaId, update: AreaUpdate) -> Result<Area, TrackingError>;
    async fn deactivate_area(&self, id: &AreaId) -> Result<(), TrackingError>;

    async fn list_macros(&self, year: i32) -> Result<Vec<MacroChallenge>, TrackingError>;
    async fn create_macro(
        &self,
        actor: &Actor,
        draft: MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError>;
    async fn update_macro(
        &self,
        id: &MacroId,
        draft: MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError>;
    async fn delete_macro(&self, id: &MacroId) -> Result<(), TrackingError>;

    async fn create_contributions(
        &self,
        batch: NewContributionBatch,
    ) -> Result<Vec<AreaContribution>, TrackingError>;
    async fn update_contribution(
        &self,
        id: &ContributionId,
        update: ContributionUpdate,
    ) -> Result<AreaContribution, TrackingError>;
    async fn set_contribution_active(
        &self,
        id: &ContributionId,
        active: bool,
    ) -> Result<(), TrackingError>;
}
