//! In-memory store implementing every outbound port, for service tests.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use progress_core::{
    latest_by_target, next_ordinals, EvaluatedReport, LatestState, TrafficLight,
};
use time::{macros::datetime, Date, Duration, OffsetDateTime};

use crate::domain::{
    models::{
        Area, AreaContribution, AreaDraft, AreaId, AreaMembership, AreaRef, AreaUpdate,
        ContributionId, ContributionUpdate, EvidenceReport, Goal, IndicatorFilter, IndicatorKind,
        MacroChallenge, MacroChallengeDraft, MacroId, NewContributionBatch, NewOwnIndicatorBatch,
        NewProgressReport, OwnIndicator, OwnIndicatorId, ProfileId, ProgressReport, ReportId,
        ReportTarget,
    },
    EvidenceError, TrackingError,
};

use super::{AreaRepository, EvidenceStore, IndicatorRepository, MacroRepository, ReportRepository};

#[derive(Default)]
struct State {
    areas: Vec<Area>,
    memberships: Vec<(ProfileId, AreaId, bool)>,
    macros: Vec<MacroChallenge>,
    contributions: Vec<AreaContribution>,
    own_indicators: Vec<OwnIndicator>,
    reports: Vec<ProgressReport>,
    objects: HashMap<String, Vec<u8>>,
    ticks: i64,
}

impl State {
    /// Strictly increasing timestamps so insertion order is creation order.
    fn now(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        datetime!(2025-01-01 00:00 UTC) + Duration::seconds(self.ticks)
    }

    fn area_ref(&self, id: &AreaId) -> Option<AreaRef> {
        self.areas.iter().find(|a| &a.id == id).map(Area::to_ref)
    }

    fn macro_title(&self, id: &MacroId) -> Option<String> {
        self.macros
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.challenge.clone())
    }
}

#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<RwLock<State>>,
    /// Paths the store refuses to sign.
    unsignable: Arc<RwLock<Vec<String>>>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_area(&self, name: &str) -> AreaId {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        let area = Area {
            id: AreaId::generate(),
            name: name.to_string(),
            kind: "direction".to_string(),
            active: true,
            created_at,
        };
        let id = area.id;
        state.areas.push(area);
        id
    }

    pub fn link(&self, profile_id: ProfileId, area_id: AreaId, is_primary: bool) {
        let mut state = self.state.write().unwrap();
        state.memberships.push((profile_id, area_id, is_primary));
    }

    pub fn add_macro(&self, year: i32, challenge: &str) -> MacroId {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        let macro_challenge = MacroChallenge {
            id: MacroId::generate(),
            year,
            responsible_area: "Rectorate".to_string(),
            challenge: challenge.to_string(),
            indicator: format!("{challenge} indicator"),
            indicator_kind: IndicatorKind::Numeric,
            goal_primary: Goal::default(),
            goal_secondary: Goal::default(),
            created_by: None,
            created_at,
        };
        let id = macro_challenge.id;
        state.macros.push(macro_challenge);
        id
    }

    pub fn add_contribution(
        &self,
        macro_id: MacroId,
        area_id: AreaId,
        year: i32,
        target_value: Option<f64>,
    ) -> ContributionId {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        let ordinal = state
            .contributions
            .iter()
            .filter(|c| c.macro_id == macro_id && c.area_id == area_id && c.year == year)
            .map(|c| c.ordinal)
            .max();
        let contribution = AreaContribution {
            id: ContributionId::generate(),
            macro_id,
            area_id,
            year,
            ordinal: *next_ordinals(ordinal, 1).start(),
            challenge: "Contribution".to_string(),
            indicator: "Indicator".to_string(),
            target_value,
            target_description: None,
            active: true,
            created_at,
            area: state.area_ref(&area_id),
            macro_challenge: state.macro_title(&macro_id),
        };
        let id = contribution.id;
        state.contributions.push(contribution);
        id
    }

    pub fn add_own_indicator(
        &self,
        area_id: AreaId,
        year: i32,
        target_value: Option<f64>,
    ) -> OwnIndicatorId {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        let indicator = OwnIndicator {
            id: OwnIndicatorId::generate(),
            area_id,
            year,
            ordinal: 0,
            challenge: "Own".to_string(),
            indicator: "Own indicator".to_string(),
            target_value,
            target_description: None,
            active: true,
            created_at,
            area: state.area_ref(&area_id),
        };
        let id = indicator.id;
        state.own_indicators.push(indicator);
        id
    }

    pub fn add_report(
        &self,
        target: ReportTarget,
        traffic_light: TrafficLight,
        percent: f64,
        report_date: Date,
    ) {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        state.reports.push(ProgressReport {
            id: ReportId::generate(),
            target,
            report_date,
            percent,
            current_value: None,
            traffic_light,
            comment: "seeded".to_string(),
            evidence_path: None,
            created_by: None,
            created_at,
        });
    }

    pub fn refuse_signing(&self, path: &str) {
        self.unsignable.write().unwrap().push(path.to_string());
    }

    pub fn reports(&self) -> Vec<ProgressReport> {
        self.state.read().unwrap().reports.clone()
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.state.read().unwrap().objects.keys().cloned().collect()
    }

    pub fn contributions(&self) -> Vec<AreaContribution> {
        self.state.read().unwrap().contributions.clone()
    }
}

fn matches_filter(filter: &IndicatorFilter, area_id: &AreaId, year: i32, active: bool) -> bool {
    filter.year.map_or(true, |y| y == year)
        && filter
            .area_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(area_id))
        && (!filter.active_only || active)
}

fn rekey<K>(state: LatestState<ReportTarget>, target_id: K) -> LatestState<K> {
    LatestState {
        target_id,
        percent: state.percent,
        traffic_light: state.traffic_light,
        period_end: state.period_end,
        current_value: state.current_value,
    }
}

#[async_trait]
impl AreaRepository for MockStore {
    async fn list_areas(&self, active_only: bool) -> Result<Vec<Area>, TrackingError> {
        let state = self.state.read().unwrap();
        let mut areas: Vec<Area> = state
            .areas
            .iter()
            .filter(|a| !active_only || a.active)
            .cloned()
            .collect();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(areas)
    }

    async fn get_area(&self, id: &AreaId) -> Result<Option<Area>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state.areas.iter().find(|a| &a.id == id).cloned())
    }

    async fn create_area(&self, draft: &AreaDraft) -> Result<Area, TrackingError> {
        let mut state = self.state.write().unwrap();
        if state.areas.iter().any(|a| a.name == draft.name) {
            return Err(TrackingError::Conflict("area name already exists".to_string()));
        }
        let created_at = state.now();
        let area = Area {
            id: AreaId::generate(),
            name: draft.name.clone(),
            kind: draft.kind.clone(),
            active: true,
            created_at,
        };
        state.areas.push(area.clone());
        Ok(area)
    }

    async fn update_area(&self, id: &AreaId, update: &AreaUpdate) -> Result<Area, TrackingError> {
        let mut state = self.state.write().unwrap();
        let area = state
            .areas
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| TrackingError::not_found("area"))?;
        area.name = update.name.clone();
        area.kind = update.kind.clone();
        if let Some(active) = update.active {
            area.active = active;
        }
        Ok(area.clone())
    }

    async fn deactivate_area(&self, id: &AreaId) -> Result<(), TrackingError> {
        let mut state = self.state.write().unwrap();
        let area = state
            .areas
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| TrackingError::not_found("area"))?;
        area.active = false;
        Ok(())
    }

    async fn memberships(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<AreaMembership>, TrackingError> {
        let state = self.state.read().unwrap();
        let mut memberships: Vec<AreaMembership> = state
            .memberships
            .iter()
            .filter(|(profile, _, _)| profile == profile_id)
            .filter_map(|(_, area_id, is_primary)| {
                state.area_ref(area_id).map(|area| AreaMembership {
                    area,
                    is_primary: *is_primary,
                })
            })
            .collect();
        memberships.sort_by_key(|m| !m.is_primary);
        Ok(memberships)
    }
}

#[async_trait]
impl MacroRepository for MockStore {
    async fn list_macros(&self, year: i32) -> Result<Vec<MacroChallenge>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state.macros.iter().filter(|m| m.year == year).cloned().collect())
    }

    async fn get_macro(&self, id: &MacroId) -> Result<Option<MacroChallenge>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state.macros.iter().find(|m| &m.id == id).cloned())
    }

    async fn create_macro(
        &self,
        draft: &MacroChallengeDraft,
        created_by: Option<ProfileId>,
    ) -> Result<MacroChallenge, TrackingError> {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        let macro_challenge = MacroChallenge {
            id: MacroId::generate(),
            year: draft.year,
            responsible_area: draft.responsible_area.clone(),
            challenge: draft.challenge.clone(),
            indicator: draft.indicator.clone(),
            indicator_kind: draft.indicator_kind,
            goal_primary: draft.goal_primary.clone(),
            goal_secondary: draft.goal_secondary.clone(),
            created_by,
            created_at,
        };
        state.macros.push(macro_challenge.clone());
        Ok(macro_challenge)
    }

    async fn update_macro(
        &self,
        id: &MacroId,
        draft: &MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError> {
        let mut state = self.state.write().unwrap();
        let existing = state
            .macros
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| TrackingError::not_found("macro challenge"))?;
        existing.year = draft.year;
        existing.responsible_area = draft.responsible_area.clone();
        existing.challenge = draft.challenge.clone();
        existing.indicator = draft.indicator.clone();
        existing.indicator_kind = draft.indicator_kind;
        existing.goal_primary = draft.goal_primary.clone();
        existing.goal_secondary = draft.goal_secondary.clone();
        Ok(existing.clone())
    }

    async fn delete_macro(&self, id: &MacroId) -> Result<(), TrackingError> {
        let mut state = self.state.write().unwrap();
        if state.contributions.iter().any(|c| &c.macro_id == id) {
            return Err(TrackingError::Conflict(
                "macro challenge still has contributions".to_string(),
            ));
        }
        state.macros.retain(|m| &m.id != id);
        Ok(())
    }
}

#[async_trait]
impl IndicatorRepository for MockStore {
    async fn list_contributions(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<AreaContribution>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state
            .contributions
            .iter()
            .filter(|c| matches_filter(filter, &c.area_id, c.year, c.active))
            .filter(|c| filter.macro_id.map_or(true, |m| m == c.macro_id))
            .cloned()
            .collect())
    }

    async fn get_contribution(
        &self,
        id: &ContributionId,
    ) -> Result<Option<AreaContribution>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state.contributions.iter().find(|c| &c.id == id).cloned())
    }

    async fn create_contributions(
        &self,
        batch: &NewContributionBatch,
    ) -> Result<Vec<AreaContribution>, TrackingError> {
        let mut state = self.state.write().unwrap();
        let current_max = state
            .contributions
            .iter()
            .filter(|c| {
                c.macro_id == batch.macro_id && c.area_id == batch.area_id && c.year == batch.year
            })
            .map(|c| c.ordinal)
            .max();

        let mut created = Vec::with_capacity(batch.items.len());
        for (ordinal, item) in next_ordinals(current_max, batch.items.len()).zip(&batch.items) {
            let created_at = state.now();
            let contribution = AreaContribution {
                id: ContributionId::generate(),
                macro_id: batch.macro_id,
                area_id: batch.area_id,
                year: batch.year,
                ordinal,
                challenge: item.challenge.clone(),
                indicator: item.indicator.clone(),
                target_value: item.target_value,
                target_description: item.target_description.clone(),
                active: true,
                created_at,
                area: state.area_ref(&batch.area_id),
                macro_challenge: state.macro_title(&batch.macro_id),
            };
            state.contributions.push(contribution.clone());
            created.push(contribution);
        }
        Ok(created)
    }

    async fn update_contribution(
        &self,
        id: &ContributionId,
        update: &ContributionUpdate,
    ) -> Result<AreaContribution, TrackingError> {
        let mut state = self.state.write().unwrap();
        let contribution = state
            .contributions
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| TrackingError::not_found("contribution"))?;
        contribution.challenge = update.draft.challenge.clone();
        contribution.indicator = update.draft.indicator.clone();
        contribution.target_value = update.draft.target_value;
        contribution.target_description = update.draft.target_description.clone();
        if let Some(ordinal) = update.ordinal {
            contribution.ordinal = ordinal;
        }
        Ok(contribution.clone())
    }

    async fn set_contribution_active(
        &self,
        id: &ContributionId,
        active: bool,
    ) -> Result<(), TrackingError> {
        let mut state = self.state.write().unwrap();
        let contribution = state
            .contributions
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| TrackingError::not_found("contribution"))?;
        contribution.active = active;
        Ok(())
    }

    async fn list_own_indicators(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<OwnIndicator>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state
            .own_indicators
            .iter()
            .filter(|i| matches_filter(filter, &i.area_id, i.year, i.active))
            .cloned()
            .collect())
    }

    async fn get_own_indicator(
        &self,
        id: &OwnIndicatorId,
    ) -> Result<Option<OwnIndicator>, TrackingError> {
        let state = self.state.read().unwrap();
        Ok(state.own_indicators.iter().find(|i| &i.id == id).cloned())
    }

    async fn create_own_indicators(
        &self,
        batch: &NewOwnIndicatorBatch,
    ) -> Result<Vec<OwnIndicator>, TrackingError> {
        let mut state = self.state.write().unwrap();
        let current_max = state
            .own_indicators
            .iter()
            .filter(|i| i.area_id == batch.area_id && i.year == batch.year)
            .map(|i| i.ordinal)
            .max();

        let mut created = Vec::with_capacity(batch.items.len());
        for (ordinal, item) in next_ordinals(current_max, batch.items.len()).zip(&batch.items) {
            let created_at = state.now();
            let indicator = OwnIndicator {
                id: OwnIndicatorId::generate(),
                area_id: batch.area_id,
                year: batch.year,
                ordinal,
                challenge: item.challenge.clone(),
                indicator: item.indicator.clone(),
                target_value: item.target_value,
                target_description: item.target_description.clone(),
                active: true,
                created_at,
                area: state.area_ref(&batch.area_id),
            };
            state.own_indicators.push(indicator.clone());
            created.push(indicator);
        }
        Ok(created)
    }
}

#[async_trait]
impl ReportRepository for MockStore {
    async fn append_report(
        &self,
        report: &NewProgressReport,
    ) -> Result<ProgressReport, TrackingError> {
        let mut state = self.state.write().unwrap();
        let created_at = state.now();
        let EvaluatedReport {
            percent,
            traffic_light,
            current_value,
            comment,
        } = report.evaluated.clone();
        let stored = ProgressReport {
            id: report.id,
            target: report.target,
            report_date: report.report_date,
            percent,
            current_value,
            traffic_light,
            comment,
            evidence_path: report.evidence_path.clone(),
            created_by: report.created_by,
            created_at,
        };
        state.reports.push(stored.clone());
        Ok(stored)
    }

    async fn report_history(
        &self,
        target: &ReportTarget,
    ) -> Result<Vec<ProgressReport>, TrackingError> {
        let state = self.state.read().unwrap();
        let mut history: Vec<ProgressReport> = state
            .reports
            .iter()
            .filter(|r| &r.target == target)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(history)
    }

    async fn latest_contribution_states(
        &self,
        ids: &[ContributionId],
    ) -> Result<HashMap<ContributionId, LatestState<ContributionId>>, TrackingError> {
        let state = self.state.read().unwrap();
        let latest = latest_by_target(state.reports.iter().cloned());
        Ok(latest
            .into_iter()
            .filter_map(|(target, latest)| match target {
                ReportTarget::Contribution(id) if ids.contains(&id) => {
                    Some((id, rekey(latest, id)))
                }
                _ => None,
            })
            .collect())
    }

    async fn latest_own_states(
        &self,
        ids: &[OwnIndicatorId],
    ) -> Result<HashMap<OwnIndicatorId, LatestState<OwnIndicatorId>>, TrackingError> {
        let state = self.state.read().unwrap();
        let latest = latest_by_target(state.reports.iter().cloned());
        Ok(latest
            .into_iter()
            .filter_map(|(target, latest)| match target {
                ReportTarget::OwnIndicator(id) if ids.contains(&id) => {
                    Some((id, rekey(latest, id)))
                }
                _ => None,
            })
            .collect())
    }

    async fn recent_evidence(&self, limit: usize) -> Result<Vec<EvidenceReport>, TrackingError> {
        let state = self.state.read().unwrap();
        let mut reports: Vec<&ProgressReport> = state
            .reports
            .iter()
            .filter(|r| r.evidence_path.is_some())
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(reports
            .into_iter()
            .filter_map(|r| {
                let ReportTarget::Contribution(contribution_id) = r.target else {
                    return None;
                };
                let contribution = state.contributions.iter().find(|c| c.id == contribution_id);
                Some(EvidenceReport {
                    report_id: r.id,
                    contribution_id,
                    evidence_path: r.evidence_path.clone()?,
                    traffic_light: r.traffic_light,
                    created_at: r.created_at,
                    indicator: contribution.map(|c| c.indicator.clone()),
                    area_name: contribution.and_then(|c| c.area.as_ref().map(|a| a.name.clone())),
                    macro_challenge: contribution.and_then(|c| c.macro_challenge.clone()),
                })
            })
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl EvidenceStore for MockStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), EvidenceError> {
        let mut state = self.state.write().unwrap();
        state.objects.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, EvidenceError> {
        if self.unsignable.read().unwrap().iter().any(|p| p == path) {
            return Err(EvidenceError::NotFound);
        }
        Ok(format!(
            "https://storage.test/sign/{path}?expires={}",
            ttl.whole_seconds()
        ))
    }
}
