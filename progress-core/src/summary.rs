use serde::Serialize;

use crate::TrafficLight;

/// Dashboard counters over a set of indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total: usize,
    pub with_updates: usize,
    pub without_updates: usize,
    pub completed: usize,
    pub at_risk: usize,
}

/// Count indicators by the traffic light of their latest report.
///
/// Each item is `Some(light)` when the indicator has a report and `None`
/// otherwise. A report without a light still counts as an update.
pub fn summarize<I>(latest_lights: I) -> StatusSummary
where
    I: IntoIterator<Item = Option<Option<TrafficLight>>>,
{
    latest_lights
        .into_iter()
        .fold(StatusSummary::default(), |mut summary, latest| {
            summary.total += 1;
            match latest {
                None => summary.without_updates += 1,
                Some(light) => {
                    summary.with_updates += 1;
                    match light {
                        Some(TrafficLight::Green) => summary.completed += 1,
                        Some(TrafficLight::Amber | TrafficLight::Red) => summary.at_risk += 1,
                        None => {}
                    }
                }
            }
            summary
        })
}

/// Share of active areas that have at least one contribution, as a whole percent.
pub fn coverage_percent(contributing_areas: usize, total_areas: usize) -> u32 {
    if total_areas == 0 {
        return 0;
    }

    (contributing_areas as f64 / total_areas as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_latest_light() {
        let summary = summarize(vec![
            Some(Some(TrafficLight::Green)),
            Some(Some(TrafficLight::Red)),
            Some(Some(TrafficLight::Amber)),
            Some(None),
            None,
            None,
        ]);

        assert_eq!(
            summary,
            StatusSummary {
                total: 6,
                with_updates: 4,
                without_updates: 2,
                completed: 1,
                at_risk: 2,
            }
        );
    }

    #[test]
    fn coverage_rounds_to_whole_percent() {
        assert_eq!(coverage_percent(1, 3), 33);
        assert_eq!(coverage_percent(2, 3), 67);
        assert_eq!(coverage_percent(4, 4), 100);
        assert_eq!(coverage_percent(0, 0), 0);
    }
}
