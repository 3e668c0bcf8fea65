use async_trait::async_trait;

use crate::domain::{
    models::{Area, AreaDraft, AreaId, AreaMembership, AreaUpdate, ProfileId},
    TrackingError,
};

/// Outbound port for areas and the profiles linked to them.
#[async_trait]
pub trait AreaRepository: Send + Sync + 'static {
    /// All areas ordered by name. Inactive areas are included unless `active_only`.
    async fn list_areas(&self, active_only: bool) -> Result<Vec<Area>, TrackingError>;

    async fn get_area(&self, id: &AreaId) -> Result<Option<Area>, TrackingError>;

    async fn create_area(&self, draft: &AreaDraft) -> Result<Area, TrackingError>;

    async fn update_area(&self, id: &AreaId, update: &AreaUpdate) -> Result<Area, TrackingError>;

    /// Areas are never deleted, only marked inactive.
    async fn deactivate_area(&self, id: &AreaId) -> Result<(), TrackingError>;

    /// Areas the profile is linked to, primary first.
    async fn memberships(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<AreaMembership>, TrackingError>;
}
