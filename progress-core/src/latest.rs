use std::{collections::HashMap, hash::Hash};

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::TrafficLight;

/// The most recent report of a target, reduced to what dashboards need.
///
/// `None` fields mean the target has no report yet; a target without any
/// report usually has no `LatestState` at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestState<K> {
    pub target_id: K,
    pub percent: Option<f64>,
    pub traffic_light: Option<TrafficLight>,
    pub period_end: Option<Date>,
    pub current_value: Option<f64>,
}

impl<K> LatestState<K> {
    pub fn new(target_id: K) -> Self {
        Self {
            target_id,
            percent: None,
            traffic_light: None,
            period_end: None,
            current_value: None,
        }
    }

    pub fn with_percent(mut self, percent: f64) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn with_traffic_light(mut self, traffic_light: TrafficLight) -> Self {
        self.traffic_light = Some(traffic_light);
        self
    }

    pub fn with_period_end(mut self, period_end: Date) -> Self {
        self.period_end = Some(period_end);
        self
    }

    pub fn with_current_value(mut self, current_value: f64) -> Self {
        self.current_value = Some(current_value);
        self
    }
}

/// An append-only report that can be reduced to a [`LatestState`].
pub trait ReportRecord {
    type TargetId: Clone + Eq + Hash;
    /// Breaks ties between reports created at the same instant.
    type ReportId: Ord;

    fn target_id(&self) -> &Self::TargetId;
    fn report_id(&self) -> Self::ReportId;
    fn created_at(&self) -> OffsetDateTime;
    fn latest_state(&self) -> LatestState<Self::TargetId>;
}

/// Pick the newest report per target: greatest `created_at`, then greatest
/// report id.
///
/// Input order does not matter.
pub fn latest_by_target<R, I>(reports: I) -> HashMap<R::TargetId, LatestState<R::TargetId>>
where
    R: ReportRecord,
    I: IntoIterator<Item = R>,
{
    let mut newest: HashMap<R::TargetId, R> = HashMap::new();

    for report in reports {
        match newest.get(report.target_id()) {
            Some(current)
                if (current.created_at(), current.report_id())
                    >= (report.created_at(), report.report_id()) => {}
            _ => {
                newest.insert(report.target_id().clone(), report);
            }
        }
    }

    newest
        .into_iter()
        .map(|(id, report)| (id, report.latest_state()))
        .collect()
}
