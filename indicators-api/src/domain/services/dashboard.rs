use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use itertools::Itertools;
use progress_core::{
    coverage_percent, rank_alerts, rollup, sort_rollups, summarize, LatestState, TrafficLight,
};
use tracing::instrument;

use crate::domain::{
    models::{
        AdminDashboard, ContributionId, ContributionStatus, Dashboard, IndicatorFilter, MacroId,
        MacroRollupDetail, MacroSummary, MemberDashboard, OwnIndicatorId,
    },
    ports::{
        inbound::DashboardService,
        outbound::{AreaRepository, IndicatorRepository, MacroRepository, ReportRepository},
    },
    Actor, TrackingError,
};

use super::reporting::area_scope;

/// How many alerts and evidence reports the admin dashboard shows.
pub const DASHBOARD_LIST_LIMIT: usize = 8;

/// Own-indicator alerts get a shorter panel.
pub const OWN_ALERT_LIMIT: usize = 6;

const UNASSIGNED_MACRO: &str = "No macro";

fn light_of<K>(latest: Option<&LatestState<K>>) -> Option<Option<TrafficLight>> {
    latest.map(|state| state.traffic_light)
}

/// Per-macro counters, riskiest first and then largest first.
fn macro_summaries(statuses: &[ContributionStatus]) -> Vec<MacroSummary> {
    let mut by_title: BTreeMap<&str, MacroSummary> = BTreeMap::new();

    for status in statuses {
        let title = status
            .contribution
            .macro_challenge
            .as_deref()
            .unwrap_or(UNASSIGNED_MACRO);
        let summary = by_title.entry(title).or_insert_with(|| MacroSummary {
            macro_challenge: title.to_string(),
            total: 0,
            risk: 0,
            completed: 0,
            no_updates: 0,
        });

        summary.total += 1;
        match status.latest.as_ref().and_then(|latest| latest.traffic_light) {
            None => summary.no_updates += 1,
            Some(light) if light.is_complete() => summary.completed += 1,
            Some(light) if light.is_at_risk() => summary.risk += 1,
            Some(_) => {}
        }
    }

    by_title
        .into_values()
        .sorted_by(|a, b| b.risk.cmp(&a.risk).then(b.total.cmp(&a.total)))
        .collect()
}

pub struct DashboardServiceImpl<A, M, I, R> {
    areas: Arc<A>,
    macros: Arc<M>,
    indicators: Arc<I>,
    reports: Arc<R>,
}

impl<A, M, I, R> DashboardServiceImpl<A, M, I, R>
where
    A: AreaRepository,
    M: MacroRepository,
    I: IndicatorRepository,
    R: ReportRepository,
{
    pub fn new(areas: Arc<A>, macros: Arc<M>, indicators: Arc<I>, reports: Arc<R>) -> Self {
        Self {
            areas,
            macros,
            indicators,
            reports,
        }
    }

    async fn contribution_statuses(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<ContributionStatus>, TrackingError> {
        let contributions = self.indicators.list_contributions(filter).await?;
        let ids = contributions.iter().map(|c| c.id).collect::<Vec<ContributionId>>();
        let mut latest = self.reports.latest_contribution_states(&ids).await?;

        Ok(contributions
            .into_iter()
            .map(|contribution| ContributionStatus {
                latest: latest.remove(&contribution.id),
                contribution,
            })
            .collect())
    }

    async fn rollups_from(
        &self,
        year: i32,
        statuses: &[ContributionStatus],
        total_areas: usize,
    ) -> Result<Vec<MacroRollupDetail>, TrackingError> {
        let macros = self.macros.list_macros(year).await?;

        let latest = statuses
            .iter()
            .filter_map(|s| s.latest.clone().map(|l| (s.contribution.id, l)))
            .collect::<HashMap<_, _>>();

        let mut details_by_macro: HashMap<MacroId, Vec<ContributionStatus>> = HashMap::new();
        for status in statuses {
            details_by_macro
                .entry(status.contribution.macro_id)
                .or_default()
                .push(status.clone());
        }

        let mut rollups = macros
            .into_iter()
            .map(|macro_challenge| {
                let contributions = details_by_macro
                    .get(&macro_challenge.id)
                    .map(|details| {
                        details
                            .iter()
                            .map(|d| d.contribution.clone())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                rollup(macro_challenge, &contributions, &latest, total_areas)
            })
            .collect::<Vec<_>>();
        sort_rollups(&mut rollups);

        Ok(rollups
            .into_iter()
            .map(|rollup| MacroRollupDetail {
                contributions: details_by_macro
                    .remove(&rollup.macro_challenge.id)
                    .unwrap_or_default(),
                rollup,
            })
            .collect())
    }

    async fn member_dashboard(
        &self,
        actor: &Actor,
        year: i32,
    ) -> Result<MemberDashboard, TrackingError> {
        let scope = area_scope(self.areas.as_ref(), actor).await?;
        let mut filter = IndicatorFilter::active_in_year(year);
        filter.area_ids = scope;

        let statuses = self.contribution_statuses(&filter).await?;

        let own = self.indicators.list_own_indicators(&filter).await?;
        let own_ids = own.iter().map(|i| i.id).collect::<Vec<OwnIndicatorId>>();
        let own_latest = self.reports.latest_own_states(&own_ids).await?;

        Ok(MemberDashboard {
            year,
            contributions: summarize(statuses.iter().map(|s| light_of(s.latest.as_ref()))),
            own_indicators: summarize(own.iter().map(|i| light_of(own_latest.get(&i.id)))),
            macros: macro_summaries(&statuses),
        })
    }
}

#[async_trait]
impl<A, M, I, R> DashboardService for DashboardServiceImpl<A, M, I, R>
where
    A: AreaRepository,
    M: MacroRepository,
    I: IndicatorRepository,
    R: ReportRepository,
{
    #[instrument(skip(self))]
    async fn dashboard(&self, actor: &Actor, year: i32) -> Result<Dashboard, TrackingError> {
        if actor.is_admin() {
            let dashboard = self.admin_dashboard(year).await?;
            return Ok(Dashboard::Admin(Box::new(dashboard)));
        }

        self.member_dashboard(actor, year)
            .await
            .map(Dashboard::Member)
    }

    #[instrument(skip(self))]
    async fn admin_dashboard(&self, year: i32) -> Result<AdminDashboard, TrackingError> {
        let filter = IndicatorFilter::active_in_year(year);

        let total_areas = self.areas.list_areas(true).await?.len();
        let statuses = self.contribution_statuses(&filter).await?;
        let contributing_areas = statuses
            .iter()
            .map(|s| s.contribution.area_id)
            .collect::<HashSet<_>>()
            .len();

        let own = self.indicators.list_own_indicators(&filter).await?;
        let own_ids = own.iter().map(|i| i.id).collect::<Vec<OwnIndicatorId>>();
        let mut own_latest = self.reports.latest_own_states(&own_ids).await?;
        let own_summary = summarize(own.iter().map(|i| light_of(own_latest.get(&i.id))));

        let macros = self.rollups_from(year, &statuses, total_areas).await?;

        let mut alerts = rank_alerts(
            statuses
                .iter()
                .map(|s| (s.contribution.clone(), s.latest.clone())),
        );
        alerts.truncate(DASHBOARD_LIST_LIMIT);

        let mut own_alerts = rank_alerts(own.into_iter().map(|indicator| {
            let latest = own_latest.remove(&indicator.id);
            (indicator, latest)
        }));
        own_alerts.truncate(OWN_ALERT_LIMIT);

        let recent_evidence = self.reports.recent_evidence(DASHBOARD_LIST_LIMIT).await?;

        Ok(AdminDashboard {
            year,
            total_areas,
            total_macros: macros.len(),
            contributing_areas,
            coverage_percent: coverage_percent(contributing_areas, total_areas),
            contributions: summarize(statuses.iter().map(|s| light_of(s.latest.as_ref()))),
            own_indicators: own_summary,
            macros,
            alerts,
            own_alerts,
            recent_evidence,
        })
    }

    #[instrument(skip(self))]
    async fn macro_rollups(&self, year: i32) -> Result<Vec<MacroRollupDetail>, TrackingError> {
        let total_areas = self.areas.list_areas(true).await?.len();
        let statuses = self
            .contribution_statuses(&IndicatorFilter::active_in_year(year))
            .await?;

        self.rollups_from(year, &statuses, total_areas).await
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::domain::{
        models::{ProfileId, ReportTarget},
        ports::outbound::MockStore,
        Role,
    };

    type Service = DashboardServiceImpl<MockStore, MockStore, MockStore, MockStore>;

    fn service(store: &MockStore) -> Service {
        DashboardServiceImpl::new(
            Arc::new(store.clone()),
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

    #[tokio::test]
    async fn member_dashboard_counts_own_area_only() {
        let store = MockStore::new();
        let own_area = store.add_area("Engineering");
        let other_area = store.add_area("Law");
        store.link(ProfileId::new(1), own_area, true);
        let graduation = store.add_macro(2025, "Graduation");
        let research = store.add_macro(2025, "Research");

        let late = store.add_contribution(graduation, own_area, 2025, None);
        let done = store.add_contribution(research, own_area, 2025, None);
        store.add_contribution(research, own_area, 2025, None);
        store.add_contribution(research, other_area, 2025, None);
        store.add_report(
            ReportTarget::Contribution(late),
            TrafficLight::Red,
            5.0,
            date!(2025 - 02 - 01),
        );
        store.add_report(
            ReportTarget::Contribution(done),
            TrafficLight::Green,
            100.0,
            date!(2025 - 02 - 01),
        );

        let dashboard = service(&store).dashboard(&member(1), 2025).await.unwrap();
        let Dashboard::Member(dashboard) = dashboard else {
            panic!("expected member dashboard");
        };

        assert_eq!(dashboard.contributions.total, 3);
        assert_eq!(dashboard.contributions.with_updates, 2);
        assert_eq!(dashboard.contributions.completed, 1);
        assert_eq!(dashboard.contributions.at_risk, 1);

        assert_eq!(dashboard.macros[0].macro_challenge, "Graduation");
        assert_eq!(dashboard.macros[0].risk, 1);
        assert_eq!(dashboard.macros[1].macro_challenge, "Research");
        assert_eq!(dashboard.macros[1].total, 2);
        assert_eq!(dashboard.macros[1].no_updates, 1);
    }

    #[tokio::test]
    async fn admin_gets_admin_dashboard() {
        let store = MockStore::new();
        let admin = Actor {
            profile_id: ProfileId::new(9),
            role: Role::Admin,
        };

        let dashboard = service(&store).dashboard(&admin, 2025).await.unwrap();

        assert!(matches!(dashboard, Dashboard::Admin(_)));
    }

    #[tokio::test]
    async fn admin_dashboard_rolls_up_and_truncates_alerts() {
        let store = MockStore::new();
        let areas = (0..4)
            .map(|i| store.add_area(&format!("Area {i}")))
            .collect::<Vec<_>>();
        let risky = store.add_macro(2025, "Risky");
        let calm = store.add_macro(2025, "Calm");
        store.add_macro(2025, "Empty");

        for day in 1..=10u8 {
            let id = store.add_contribution(risky, areas[0], 2025, None);
            store.add_report(
                ReportTarget::Contribution(id),
                TrafficLight::Amber,
                50.0,
                time::Date::from_calendar_date(2025, time::Month::March, day).unwrap(),
            );
        }
        let red = store.add_contribution(risky, areas[1], 2025, None);
        store.add_report(
            ReportTarget::Contribution(red),
            TrafficLight::Red,
            10.0,
            date!(2025 - 01 - 01),
        );
        let green = store.add_contribution(calm, areas[2], 2025, None);
        store.add_report(
            ReportTarget::Contribution(green),
            TrafficLight::Green,
            100.0,
            date!(2025 - 01 - 01),
        );

        let dashboard = service(&store).admin_dashboard(2025).await.unwrap();

        assert_eq!(dashboard.total_areas, 4);
        assert_eq!(dashboard.total_macros, 3);
        assert_eq!(dashboard.contributing_areas, 3);
        assert_eq!(dashboard.coverage_percent, 75);
        assert_eq!(dashboard.contributions.total, 12);

        assert_eq!(dashboard.alerts.len(), DASHBOARD_LIST_LIMIT);
        assert_eq!(dashboard.alerts[0].severity, TrafficLight::Red);
        assert_eq!(
            dashboard.alerts[1].latest.period_end,
            Some(date!(2025 - 03 - 10))
        );

        let order = dashboard
            .macros
            .iter()
            .map(|m| m.rollup.macro_challenge.challenge.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["Risky", "Calm", "Empty"]);

        let calm_rollup = &dashboard.macros[1].rollup;
        assert_eq!(calm_rollup.macro_percent_strict, Some(100.0));
        assert_eq!(calm_rollup.macro_traffic_light, Some(TrafficLight::Green));
        assert_eq!(calm_rollup.missing_areas_count, 3);
        assert_eq!(dashboard.macros[0].contributions.len(), 11);

        let empty_rollup = &dashboard.macros[2].rollup;
        assert_eq!(empty_rollup.macro_percent_strict, None);
        assert_eq!(empty_rollup.macro_traffic_light, None);
    }

    #[tokio::test]
    async fn own_indicator_alerts_are_ranked() {
        let store = MockStore::new();
        let area = store.add_area("Library");
        let amber = store.add_own_indicator(area, 2025, None);
        let red = store.add_own_indicator(area, 2025, None);
        store.add_report(
            ReportTarget::OwnIndicator(amber),
            TrafficLight::Amber,
            30.0,
            date!(2025 - 05 - 01),
        );
        store.add_report(
            ReportTarget::OwnIndicator(red),
            TrafficLight::Red,
            0.0,
            date!(2025 - 01 - 01),
        );

        let dashboard = service(&store).admin_dashboard(2025).await.unwrap();

        assert_eq!(dashboard.own_indicators.at_risk, 2);
        assert_eq!(dashboard.own_alerts.len(), 2);
        assert_eq!(dashboard.own_alerts[0].item.id, red);
    }

    #[tokio::test]
    async fn own_indicator_alerts_are_capped_shorter_than_contribution_alerts() {
        let store = MockStore::new();
        let area = store.add_area("Library");
        for _ in 0..9 {
            let indicator = store.add_own_indicator(area, 2025, None);
            store.add_report(
                ReportTarget::OwnIndicator(indicator),
                TrafficLight::Red,
                5.0,
                date!(2025 - 04 - 01),
            );
        }

        let dashboard = service(&store).admin_dashboard(2025).await.unwrap();

        assert_eq!(dashboard.own_indicators.at_risk, 9);
        assert_eq!(dashboard.own_alerts.len(), OWN_ALERT_LIMIT);
    }
}
