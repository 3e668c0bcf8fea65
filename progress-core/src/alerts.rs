use serde::Serialize;

use crate::{LatestState, TrafficLight};

/// An at-risk item together with the report that put it there.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry<T, K> {
    pub item: T,
    pub severity: TrafficLight,
    pub latest: LatestState<K>,
}

/// Keep red and amber items, most severe first, then most recent first.
///
/// Items without a report or with a green report are dropped. Items without
/// a period end sort last within their severity. The result is not
/// truncated; callers decide how many to show.
pub fn rank_alerts<T, K, I>(items: I) -> Vec<AlertEntry<T, K>>
where
    I: IntoIterator<Item = (T, Option<LatestState<K>>)>,
{
    let mut alerts = items
        .into_iter()
        .filter_map(|(item, latest)| {
            let latest = latest?;
            let severity = latest.traffic_light.filter(|light| light.is_at_risk())?;
            Some(AlertEntry {
                item,
                severity,
                latest,
            })
        })
        .collect::<Vec<_>>();

    alerts.sort_by(|a, b| {
        a.severity
            .severity_rank()
            .cmp(&b.severity.severity_rank())
            .then_with(|| b.latest.period_end.cmp(&a.latest.period_end))
    });

    alerts
}
