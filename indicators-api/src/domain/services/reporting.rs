use std::sync::Arc;

use async_trait::async_trait;
use progress_core::{evaluate, ReportInput, Target};
use tracing::instrument;

use crate::domain::{
    models::{
        AreaId, ContributionDetail, ContributionId, ContributionStatus, IndicatorDraft,
        IndicatorFilter, NewOwnIndicatorBatch, NewProgressReport, OwnIndicator,
        OwnIndicatorDetail, OwnIndicatorId, OwnIndicatorStatus, ProgressReport, ReportId,
        ReportTarget, SubmitReport,
    },
    ports::{
        inbound::ReportingService,
        outbound::{AreaRepository, IndicatorRepository, ReportRepository},
    },
    Actor, TrackingError,
};

use super::evidence::{evidence_in_scope, validate_object_path};

/// Which areas an actor may see. `None` means every area.
pub(crate) type AreaScope = Option<Vec<AreaId>>;

/// Resolve the areas visible to the actor, failing when a member has none.
pub(crate) async fn area_scope<A: AreaRepository>(
    areas: &A,
    actor: &Actor,
) -> Result<AreaScope, TrackingError> {
    if actor.is_admin() {
        return Ok(None);
    }

    let memberships = areas.memberships(&actor.profile_id).await?;
    if memberships.is_empty() {
        return Err(TrackingError::NoAreaAssigned);
    }

    Ok(Some(memberships.into_iter().map(|m| m.area.id).collect()))
}

fn in_scope(scope: &AreaScope, area_id: &AreaId) -> bool {
    scope.as_ref().map_or(true, |ids| ids.contains(area_id))
}

fn scoped_filter(year: i32, scope: AreaScope) -> IndicatorFilter {
    let filter = IndicatorFilter::active_in_year(year);
    match scope {
        Some(area_ids) => filter.for_areas(area_ids),
        None => filter,
    }
}

/// Targets are optional, but a present one must be a finite, non-negative number.
pub(crate) fn validate_target_value(target_value: Option<f64>) -> Result<(), TrackingError> {
    match target_value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(TrackingError::validation(
            "target value must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn validate_indicator_drafts(items: &[IndicatorDraft]) -> Result<(), TrackingError> {
    if items.is_empty() {
        return Err(TrackingError::validation("at least one indicator is required"));
    }

    for item in items {
        if item.challenge.trim().is_empty() || item.indicator.trim().is_empty() {
            return Err(TrackingError::validation(
                "every row needs a challenge and an indicator",
            ));
        }
        validate_target_value(item.target_value)?;
    }

    Ok(())
}

pub struct ReportingServiceImpl<I, R, A> {
    indicators: Arc<I>,
    reports: Arc<R>,
    areas: Arc<A>,
}

impl<I, R, A> ReportingServiceImpl<I, R, A>
where
    I: IndicatorRepository,
    R: ReportRepository,
    A: AreaRepository,
{
    pub fn new(indicators: Arc<I>, reports: Arc<R>, areas: Arc<A>) -> Self {
        Self {
            indicators,
            reports,
            areas,
        }
    }

    /// Evaluate and append a report. Nothing is written when evaluation fails.
    async fn append_evaluated(
        &self,
        actor: &Actor,
        scope: &AreaScope,
        target: ReportTarget,
        goal: &Target,
        report: SubmitReport,
    ) -> Result<ProgressReport, TrackingError> {
        let evidence_path = match report
            .evidence_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
        {
            Some(path) => {
                let path = validate_object_path(path)
                    .map_err(|_| TrackingError::validation("invalid evidence path"))?;
                if !evidence_in_scope(scope, path) {
                    return Err(TrackingError::Forbidden("evidence".to_string()));
                }
                Some(path.to_string())
            }
            None => None,
        };

        let input = ReportInput {
            current_value: report.current_value,
            manual_percent: report.percent,
            declared_status: report.traffic_light.unwrap_or_default(),
            comment: report.comment,
        };
        let evaluated = evaluate(goal, &input)?;

        let new_report = NewProgressReport {
            id: ReportId::generate(),
            target,
            report_date: report.report_date,
            evaluated,
            evidence_path,
            created_by: Some(actor.profile_id),
        };

        let stored = self.reports.append_report(&new_report).await?;
        tracing::info!(
            report_id = %stored.id,
            percent = stored.percent,
            traffic_light = %stored.traffic_light,
            "progress report appended"
        );

        Ok(stored)
    }
}

#[async_trait]
impl<I, R, A> ReportingService for ReportingServiceImpl<I, R, A>
where
    I: IndicatorRepository,
    R: ReportRepository,
    A: AreaRepository,
{
    #[instrument(skip(self))]
    async fn list_contributions(
        &self,
        actor: &Actor,
        year: i32,
    ) -> Result<Vec<ContributionStatus>, TrackingError> {
        let scope = area_scope(self.areas.as_ref(), actor).await?;
        let contributions = self
            .indicators
            .list_contributions(&scoped_filter(year, scope))
            .await?;

        let ids = contributions.iter().map(|c| c.id).collect::<Vec<_>>();
        let mut latest = self.reports.latest_contribution_states(&ids).await?;

        Ok(contributions
            .into_iter()
            .map(|contribution| ContributionStatus {
                latest: latest.remove(&contribution.id),
                contribution,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn contribution_detail(
        &self,
        actor: &Actor,
        id: &ContributionId,
    ) -> Result<ContributionDetail, TrackingError> {
        let contribution = self
            .indicators
            .get_contribution(id)
            .await?
            .ok_or_else(|| TrackingError::not_found("contribution"))?;

        let scope = area_scope(self.areas.as_ref(), actor).await?;
        if !in_scope(&scope, &contribution.area_id) {
            return Err(TrackingError::Forbidden("contribution".to_string()));
        }

        let history = self
            .reports
            .report_history(&ReportTarget::Contribution(*id))
            .await?;
        let latest = self
            .reports
            .latest_contribution_states(&[*id])
            .await?
            .remove(id);

        Ok(ContributionDetail {
            status: ContributionStatus {
                contribution,
                latest,
            },
            history,
        })
    }

    #[instrument(skip(self, report))]
    async fn submit_contribution_report(
        &self,
        actor: &Actor,
        id: &ContributionId,
        report: SubmitReport,
    ) -> Result<ProgressReport, TrackingError> {
        let contribution = self
            .indicators
            .get_contribution(id)
            .await?
            .ok_or_else(|| TrackingError::not_found("contribution"))?;

        let scope = area_scope(self.areas.as_ref(), actor).await?;
        if !in_scope(&scope, &contribution.area_id) {
            return Err(TrackingError::Forbidden("contribution".to_string()));
        }

        self.append_evaluated(
            actor,
            &scope,
            ReportTarget::Contribution(*id),
            &contribution.target(),
            report,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_own_indicators(
        &self,
        actor: &Actor,
        year: i32,
    ) -> Result<Vec<OwnIndicatorStatus>, TrackingError> {
        let scope = area_scope(self.areas.as_ref(), actor).await?;
        let indicators = self
            .indicators
            .list_own_indicators(&scoped_filter(year, scope))
            .await?;

        let ids = indicators.iter().map(|i| i.id).collect::<Vec<_>>();
        let mut latest = self.reports.latest_own_states(&ids).await?;

        Ok(indicators
            .into_iter()
            .map(|indicator| OwnIndicatorStatus {
                latest: latest.remove(&indicator.id),
                indicator,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn own_indicator_detail(
        &self,
        actor: &Actor,
        id: &OwnIndicatorId,
    ) -> Result<OwnIndicatorDetail, TrackingError> {
        let indicator = self
            .indicators
            .get_own_indicator(id)
            .await?
            .ok_or_else(|| TrackingError::not_found("own indicator"))?;

        let scope = area_scope(self.areas.as_ref(), actor).await?;
        if !in_scope(&scope, &indicator.area_id) {
            return Err(TrackingError::Forbidden("own indicator".to_string()));
        }

        let history = self
            .reports
            .report_history(&ReportTarget::OwnIndicator(*id))
            .await?;
        let latest = self.reports.latest_own_states(&[*id]).await?.remove(id);

        Ok(OwnIndicatorDetail {
            status: OwnIndicatorStatus { indicator, latest },
            history,
        })
    }

    #[instrument(skip(self, items))]
    async fn create_own_indicators(
        &self,
        actor: &Actor,
        year: i32,
        items: Vec<IndicatorDraft>,
    ) -> Result<Vec<OwnIndicator>, TrackingError> {
        validate_indicator_drafts(&items)?;

        let primary = self
            .areas
            .memberships(&actor.profile_id)
            .await?
            .into_iter()
            .next()
            .ok_or(TrackingError::NoAreaAssigned)?;

        let batch = NewOwnIndicatorBatch {
            area_id: primary.area.id,
            year,
            items,
            created_by: Some(actor.profile_id),
        };

        self.indicators.create_own_indicators(&batch).await
    }

    #[instrument(skip(self, report))]
    async fn submit_own_report(
        &self,
        actor: &Actor,
        id: &OwnIndicatorId,
        report: SubmitReport,
    ) -> Result<ProgressReport, TrackingError> {
        let indicator = self
            .indicators
            .get_own_indicator(id)
            .await?
            .ok_or_else(|| TrackingError::not_found("own indicator"))?;

        let scope = area_scope(self.areas.as_ref(), actor).await?;
        if !in_scope(&scope, &indicator.area_id) {
            return Err(TrackingError::Forbidden("own indicator".to_string()));
        }

        self.append_evaluated(
            actor,
            &scope,
            ReportTarget::OwnIndicator(*id),
            &indicator.target(),
            report,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use progress_core::{EvaluationError, TrafficLight};
    use time::macros::date;

    use super::*;
    use crate::domain::{models::ProfileId, ports::outbound::MockStore, Role};

    type Service = ReportingServiceImpl<MockStore, MockStore, MockStore>;

    fn service(store: &MockStore) -> Service {
        ReportingServiceImpl::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    fn member(id: i32) -> Actor {
        Actor {
            profile_id: ProfileId::new(id),
            role: Role::Member,
        }
    }

    fn admin() -> Actor {
        Actor {
            profile_id: ProfileId::new(99),
            role: Role::Admin,
        }
    }

    fn submission(light: TrafficLight, current_value: Option<f64>) -> SubmitReport {
        SubmitReport {
            report_date: date!(2025 - 03 - 31),
            current_value,
            percent: None,
            traffic_light: Some(light),
            comment: "Quarter closed".to_string(),
            evidence_path: None,
        }
    }

    #[tokio::test]
    async fn numeric_report_is_evaluated_and_appended() {
        let store = MockStore::new();
        let area = store.add_area("Engineering");
        store.link(ProfileId::new(1), area, true);
        let macro_id = store.add_macro(2025, "Graduation");
        let contribution = store.add_contribution(macro_id, area, 2025, Some(40.0));

        let report = service(&store)
            .submit_contribution_report(
                &member(1),
                &contribution,
                submission(TrafficLight::Amber, Some(30.0)),
            )
            .await
            .unwrap();

        assert_eq!(report.percent, 75.0);
        assert_eq!(report.traffic_light, TrafficLight::Amber);
        assert_eq!(report.created_by, Some(ProfileId::new(1)));
        assert_eq!(store.reports().len(), 1);
    }

    #[tokio::test]
    async fn rejected_report_is_not_persisted() {
        let store = MockStore::new();
        let area = store.add_area("Engineering");
        store.link(ProfileId::new(1), area, true);
        let macro_id = store.add_macro(2025, "Graduation");
        let contribution = store.add_contribution(macro_id, area, 2025, Some(40.0));

        let err = service(&store)
            .submit_contribution_report(
                &member(1),
                &contribution,
                submission(TrafficLight::Green, Some(30.0)),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TrackingError::Evaluation(EvaluationError::InconsistentCompletion)
        ));
        assert!(store.reports().is_empty());
    }

    #[tokio::test]
    async fn missing_light_defaults_to_amber_and_blank_evidence_is_dropped() {
        let store = MockStore::new();
        let area = store.add_area("Library");
        store.link(ProfileId::new(1), area, true);
        let indicator = store.add_own_indicator(area, 2025, None);

        let mut report = submission(TrafficLight::Green, None);
        report.traffic_light = None;
        report.percent = Some(40.0);
        report.evidence_path = Some("   ".to_string());

        let stored = service(&store)
            .submit_own_report(&member(1), &indicator, report)
            .await
            .unwrap();

        assert_eq!(stored.traffic_light, TrafficLight::Amber);
        assert_eq!(stored.percent, 40.0);
        assert_eq!(stored.evidence_path, None);
    }

    #[tokio::test]
    async fn member_cannot_report_on_other_areas() {
        let store = MockStore::new();
        let own_area = store.add_area("Engineering");
        let other_area = store.add_area("Law");
        store.link(ProfileId::new(1), own_area, true);
        let macro_id = store.add_macro(2025, "Graduation");
        let contribution = store.add_contribution(macro_id, other_area, 2025, None);

        let err = service(&store)
            .submit_contribution_report(
                &member(1),
                &contribution,
                submission(TrafficLight::Amber, None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::Forbidden(_)));
    }

    #[tokio::test]
    async fn member_without_area_is_rejected() {
        let store = MockStore::new();

        let err = service(&store)
            .list_contributions(&member(7), 2025)
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::NoAreaAssigned));
    }

    #[tokio::test]
    async fn listing_is_scoped_to_member_areas_and_carries_latest_state() {
        let store = MockStore::new();
        let own_area = store.add_area("Engineering");
        let other_area = store.add_area("Law");
        store.link(ProfileId::new(1), own_area, true);
        let macro_id = store.add_macro(2025, "Graduation");
        let mine = store.add_contribution(macro_id, own_area, 2025, None);
        store.add_contribution(macro_id, other_area, 2025, None);
        store.add_contribution(macro_id, own_area, 2024, None);
        store.add_report(
            ReportTarget::Contribution(mine),
            TrafficLight::Red,
            10.0,
            date!(2025 - 02 - 01),
        );

        let listed = service(&store)
            .list_contributions(&member(1), 2025)
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].contribution.id, mine);
        let latest = listed[0].latest.as_ref().unwrap();
        assert_eq!(latest.traffic_light, Some(TrafficLight::Red));

        let all = service(&store).list_contributions(&admin(), 2025).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn detail_lists_history_newest_first() {
        let store = MockStore::new();
        let area = store.add_area("Engineering");
        let macro_id = store.add_macro(2025, "Graduation");
        let contribution = store.add_contribution(macro_id, area, 2025, None);
        let target = ReportTarget::Contribution(contribution);
        store.add_report(target, TrafficLight::Red, 10.0, date!(2025 - 01 - 31));
        store.add_report(target, TrafficLight::Amber, 50.0, date!(2025 - 02 - 28));

        let detail = service(&store)
            .contribution_detail(&admin(), &contribution)
            .await
            .unwrap();

        assert_eq!(detail.history.len(), 2);
        assert_eq!(detail.history[0].percent, 50.0);
        assert_eq!(
            detail.status.latest.unwrap().traffic_light,
            Some(TrafficLight::Amber)
        );
    }

    #[tokio::test]
    async fn own_indicators_are_created_in_primary_area_with_next_ordinals() {
        let store = MockStore::new();
        let secondary = store.add_area("Library");
        let primary = store.add_area("Engineering");
        store.link(ProfileId::new(1), secondary, false);
        store.link(ProfileId::new(1), primary, true);

        let draft = |name: &str| IndicatorDraft {
            challenge: name.to_string(),
            indicator: format!("{name} count"),
            target_value: Some(10.0),
            target_description: None,
        };
        let service = service(&store);

        let first = service
            .create_own_indicators(&member(1), 2025, vec![draft("Labs"), draft("Papers")])
            .await
            .unwrap();
        let second = service
            .create_own_indicators(&member(1), 2025, vec![draft("Talks")])
            .await
            .unwrap();

        assert!(first.iter().all(|i| i.area_id == primary));
        assert_eq!(
            first.iter().map(|i| i.ordinal).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(second[0].ordinal, 3);
    }

    #[tokio::test]
    async fn own_indicator_rows_need_challenge_and_indicator() {
        let store = MockStore::new();
        let area = store.add_area("Engineering");
        store.link(ProfileId::new(1), area, true);

        let err = service(&store)
            .create_own_indicators(
                &member(1),
                2025,
                vec![IndicatorDraft {
                    challenge: "  ".to_string(),
                    indicator: "Count".to_string(),
                    target_value: None,
                    target_description: None,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::Validation(_)));

        let err = service(&store)
            .create_own_indicators(&member(1), 2025, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::Validation(_)));
    }

    #[tokio::test]
    async fn evidence_must_live_under_the_reporters_areas() {
        let store = MockStore::new();
        let own_area = store.add_area("Engineering");
        let other_area = store.add_area("Law");
        store.link(ProfileId::new(1), own_area, true);
        let indicator = store.add_own_indicator(own_area, 2025, None);
        let service = service(&store);

        let with_evidence = |path: String| {
            let mut report = submission(TrafficLight::Amber, None);
            report.percent = Some(50.0);
            report.evidence_path = Some(path);
            report
        };

        let err = service
            .submit_own_report(
                &member(1),
                &indicator,
                with_evidence(format!("{other_area}/id/minutes.pdf")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::Forbidden(_)));

        let err = service
            .submit_own_report(
                &member(1),
                &indicator,
                with_evidence(format!("{own_area}/../{other_area}/minutes.pdf")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrackingError::Validation(_)));
        assert!(store.reports().is_empty());

        let path = format!("{own_area}/id/minutes.pdf");
        let stored = service
            .submit_own_report(&member(1), &indicator, with_evidence(format!(" {path} ")))
            .await
            .unwrap();
        assert_eq!(stored.evidence_path, Some(path));

        let foreign = format!("{other_area}/id/minutes.pdf");
        let stored = service
            .submit_own_report(&admin(), &indicator, with_evidence(foreign.clone()))
            .await
            .unwrap();
        assert_eq!(stored.evidence_path, Some(foreign));
    }

    #[tokio::test]
    async fn own_indicator_targets_must_not_be_negative() {
        let store = MockStore::new();
        let area = store.add_area("Engineering");
        store.link(ProfileId::new(1), area, true);

        let err = service(&store)
            .create_own_indicators(
                &member(1),
                2025,
                vec![IndicatorDraft {
                    challenge: "Labs".to_string(),
                    indicator: "Lab count".to_string(),
                    target_value: Some(-1.0),
                    target_description: None,
                }],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::Validation(_)));
    }
}
