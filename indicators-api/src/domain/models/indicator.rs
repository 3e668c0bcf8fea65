use progress_core::{Contribution, Target};
use time::OffsetDateTime;

use super::{AreaId, AreaRef, ContributionId, MacroId, OwnIndicatorId, ProfileId};

/// An area's sub-goal under a macro challenge.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaContribution {
    pub id: ContributionId,
    pub macro_id: MacroId,
    pub area_id: AreaId,
    pub year: i32,
    /// Position within its (macro, area, year) group.
    pub ordinal: i32,
    pub challenge: String,
    pub indicator: String,
    pub target_value: Option<f64>,
    pub target_description: Option<String>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    /// Joined area, if it was loaded.
    pub area: Option<AreaRef>,
    /// Joined macro challenge title, if it was loaded.
    pub macro_challenge: Option<String>,
}

impl AreaContribution {
    pub fn target(&self) -> Target {
        Target {
            target_value: self.target_value,
            target_description: self.target_description.clone(),
        }
    }
}

impl Contribution for AreaContribution {
    type Id = ContributionId;
    type AreaId = AreaId;

    fn id(&self) -> &ContributionId {
        &self.id
    }

    fn area_id(&self) -> &AreaId {
        &self.area_id
    }
}

/// An indicator an area tracks for itself, outside any macro.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnIndicator {
    pub id: OwnIndicatorId,
    pub area_id: AreaId,
    pub year: i32,
    /// Position within its (area, year) group.
    pub ordinal: i32,
    pub challenge: String,
    pub indicator: String,
    pub target_value: Option<f64>,
    pub target_description: Option<String>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub area: Option<AreaRef>,
}

impl OwnIndicator {
    pub fn target(&self) -> Target {
        Target {
            target_value: self.target_value,
            target_description: self.target_description.clone(),
        }
    }
}

/// One row of a batch of new contributions or own indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDraft {
    pub challenge: String,
    pub indicator: String,
    pub target_value: Option<f64>,
    pub target_description: Option<String>,
}

/// New contributions for one (macro, area, year) group.
///
/// Ordinals are assigned by the repository when the batch is stored.
#[derive(Debug, Clone)]
pub struct NewContributionBatch {
    pub macro_id: MacroId,
    pub area_id: AreaId,
    pub year: i32,
    pub items: Vec<IndicatorDraft>,
    pub created_by: Option<ProfileId>,
}

/// New own indicators for one (area, year) group.
#[derive(Debug, Clone)]
pub struct NewOwnIndicatorBatch {
    pub area_id: AreaId,
    pub year: i32,
    pub items: Vec<IndicatorDraft>,
    pub created_by: Option<ProfileId>,
}

/// Edits to an existing contribution. `ordinal` is only changed when set.
#[derive(Debug, Clone)]
pub struct ContributionUpdate {
    pub draft: IndicatorDraft,
    pub ordinal: Option<i32>,
}

/// Which contributions to load.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFilter {
    pub year: Option<i32>,
    /// Restrict to these areas; `None` means every area.
    pub area_ids: Option<Vec<AreaId>>,
    pub macro_id: Option<MacroId>,
    pub active_only: bool,
}

impl IndicatorFilter {
    pub fn active_in_year(year: i32) -> Self {
        Self {
            year: Some(year),
            active_only: true,
            ..Self::default()
        }
    }

    pub fn for_areas(mut self, area_ids: Vec<AreaId>) -> Self {
        self.area_ids = Some(area_ids);
        self
    }
}
