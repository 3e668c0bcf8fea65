use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    models::{
        Area, AreaContribution, AreaDraft, AreaId, AreaUpdate, ContributionId,
        ContributionUpdate, IndicatorDraft, MacroChallenge, MacroChallengeDraft, MacroId,
        NewContributionBatch,
    },
    ports::{
        inbound::AdministrationService,
        outbound::{AreaRepository, IndicatorRepository, MacroRepository},
    },
    Actor, TrackingError,
};

use super::reporting::{validate_indicator_drafts, validate_target_value};

fn required(value: &str, field: &str) -> Result<String, TrackingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrackingError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn clean_area(draft: AreaDraft) -> Result<AreaDraft, TrackingError> {
    Ok(AreaDraft {
        name: required(&draft.name, "name")?,
        kind: required(&draft.kind, "kind")?,
    })
}

fn clean_macro(draft: MacroChallengeDraft) -> Result<MacroChallengeDraft, TrackingError> {
    Ok(MacroChallengeDraft {
        responsible_area: required(&draft.responsible_area, "responsible area")?,
        challenge: required(&draft.challenge, "challenge")?,
        indicator: required(&draft.indicator, "indicator")?,
        ..draft
    })
}

fn clean_indicator(draft: IndicatorDraft) -> Result<IndicatorDraft, TrackingError> {
    validate_target_value(draft.target_value)?;

    Ok(IndicatorDraft {
        challenge: required(&draft.challenge, "challenge")?,
        indicator: required(&draft.indicator, "indicator")?,
        target_description: draft
            .target_description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        ..draft
    })
}

pub struct AdministrationServiceImpl<A, M, I> {
    areas: Arc<A>,
    macros: Arc<M>,
    indicators: Arc<I>,
}

impl<A, M, I> AdministrationServiceImpl<A, M, I>
where
    A: AreaRepository,
    M: MacroRepository,
    I: IndicatorRepository,
{
    pub fn new(areas: Arc<A>, macros: Arc<M>, indicators: Arc<I>) -> Self {
        Self {
            areas,
            macros,
            indicators,
        }
    }
}

#[async_trait]
impl<A, M, I> AdministrationService for AdministrationServiceImpl<A, M, I>
where
    A: AreaRepository,
    M: MacroRepository,
    I: IndicatorRepository,
{
    async fn list_areas(&self) -> Result<Vec<Area>, TrackingError> {
        self.areas.list_areas(false).await
    }

    #[instrument(skip(self))]
    async fn create_area(&self, draft: AreaDraft) -> Result<Area, TrackingError> {
        self.areas.create_area(&clean_area(draft)?).await
    }

    #[instrument(skip(self))]
    async fn update_area(&self, id: &AreaId, update: AreaUpdate) -> Result<Area, TrackingError> {
        let update = AreaUpdate {
            name: required(&update.name, "name")?,
            kind: required(&update.kind, "kind")?,
            active: update.active,
        };
        self.areas.update_area(id, &update).await
    }

    #[instrument(skip(self))]
    async fn deactivate_area(&self, id: &AreaId) -> Result<(), TrackingError> {
        self.areas.deactivate_area(id).await
    }

    async fn list_macros(&self, year: i32) -> Result<Vec<MacroChallenge>, TrackingError> {
        self.macros.list_macros(year).await
    }

    #[instrument(skip(self))]
    async fn create_macro(
        &self,
        actor: &Actor,
        draft: MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError> {
        self.macros
            .create_macro(&clean_macro(draft)?, Some(actor.profile_id))
            .await
    }

    #[instrument(skip(self))]
    async fn update_macro(
        &self,
        id: &MacroId,
        draft: MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError> {
        self.macros.update_macro(id, &clean_macro(draft)?).await
    }

    #[instrument(skip(self))]
    async fn delete_macro(&self, id: &MacroId) -> Result<(), TrackingError> {
        self.macros.delete_macro(id).await
    }

    #[instrument(skip(self, batch), fields(macro_id = %batch.macro_id, area_id = %batch.area_id))]
    async fn create_contributions(
        &self,
        batch: NewContributionBatch,
    ) -> Result<Vec<AreaContribution>, TrackingError> {
        validate_indicator_drafts(&batch.items)?;

        let macro_challenge = self
            .macros
            .get_macro(&batch.macro_id)
            .await?
            .ok_or_else(|| TrackingError::not_found("macro challenge"))?;
        if macro_challenge.year != batch.year {
            return Err(TrackingError::validation(
                "contribution year must match the macro challenge year",
            ));
        }

        let area = self
            .areas
            .get_area(&batch.area_id)
            .await?
            .ok_or_else(|| TrackingError::not_found("area"))?;
        if !area.active {
            return Err(TrackingError::validation("area is inactive"));
        }

        let items = batch
            .items
            .into_iter()
            .map(clean_indicator)
            .collect::<Result<Vec<_>, _>>()?;
        let batch = NewContributionBatch { items, ..batch };

        let created = self.indicators.create_contributions(&batch).await?;
        tracing::info!(count = created.len(), "contributions created");

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn update_contribution(
        &self,
        id: &ContributionId,
        update: ContributionUpdate,
    ) -> Result<AreaContribution, TrackingError> {
        if update.ordinal.is_some_and(|ordinal| ordinal < 0) {
            return Err(TrackingError::validation("ordinal must not be negative"));
        }

        let update = ContributionUpdate {
            draft: clean_indicator(update.draft)?,
            ordinal: update.ordinal,
        };
        self.indicators.update_contribution(id, &update).await
    }

    #[instrument(skip(self))]
    async fn set_contribution_active(
        &self,
        id: &ContributionId,
        active: bool,
    ) -> Result<(), TrackingError> {
        self.indicators.set_contribution_active(id, active).await
    }
}
