use async_trait::async_trait;

use crate::domain::{
    models::{MacroChallenge, MacroChallengeDraft, MacroId, ProfileId},
    TrackingError,
};

#[async_trait]
pub trait MacroRepository: Send + Sync + 'static {
    async fn list_macros(&self, year: i32) -> Result<Vec<MacroChallenge>, TrackingError>;

    async fn get_macro(&self, id: &MacroId) -> Result<Option<MacroChallenge>, TrackingError>;

    async fn create_macro(
        &self,
        draft: &MacroChallengeDraft,
        created_by: Option<ProfileId>,
    ) -> Result<MacroChallenge, TrackingError>;

    async fn update_macro(
        &self,
        id: &MacroId,
        draft: &MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError>;

    /// Fails with [`TrackingError::Conflict`] while contributions still reference the macro.
    async fn delete_macro(&self, id: &MacroId) -> Result<(), TrackingError>;
}
