use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    hash::Hash,
};

use serde::Serialize;

use crate::{round2, LatestState, TrafficLight};

/// Highest percent a macro can show while any contribution is incomplete.
pub const INCOMPLETE_PERCENT_CAP: f64 = 99.99;

/// An area-level contribution feeding a macro challenge.
pub trait Contribution {
    type Id: Eq + Hash;
    type AreaId: Eq + Hash;

    fn id(&self) -> &Self::Id;
    fn area_id(&self) -> &Self::AreaId;
}

/// Consolidated progress of one macro challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroRollup<M> {
    #[serde(rename = "macro")]
    pub macro_challenge: M,
    pub contributions_count: usize,
    pub contributing_areas_count: usize,
    pub missing_areas_count: usize,
    pub with_updates_count: usize,
    pub completed_count: usize,
    pub risk_count: usize,
    pub average_percent: Option<f64>,
    pub macro_percent_strict: Option<f64>,
    pub macro_traffic_light: Option<TrafficLight>,
}

/// Fold the latest state of every contribution under a macro into one figure.
///
/// The strict percent only reaches 100 when every contribution is green;
/// otherwise the average is capped at [`INCOMPLETE_PERCENT_CAP`].
pub fn rollup<M, C>(
    macro_challenge: M,
    contributions: &[C],
    latest_by_contribution: &HashMap<C::Id, LatestState<C::Id>>,
    total_area_count: usize,
) -> MacroRollup<M>
where
    C: Contribution,
{
    let latest_of = |c: &C| latest_by_contribution.get(c.id());
    let light_of = |c: &C| latest_of(c).and_then(|latest| latest.traffic_light);

    let contributions_count = contributions.len();
    let contributing_areas_count = contributions
        .iter()
        .map(|c| c.area_id())
        .collect::<HashSet<_>>()
        .len();
    let missing_areas_count = total_area_count.saturating_sub(contributing_areas_count);

    let with_updates_count = contributions.iter().filter(|&c| latest_of(c).is_some()).count();
    let completed_count = contributions
        .iter()
        .filter(|&c| light_of(c) == Some(TrafficLight::Green))
        .count();
    let risk_count = contributions
        .iter()
        .filter(|&c| light_of(c).is_some_and(TrafficLight::is_at_risk))
        .count();

    let percents = contributions
        .iter()
        .filter_map(|c| latest_of(c).and_then(|latest| latest.percent))
        .collect::<Vec<_>>();
    let average_percent = if percents.is_empty() {
        None
    } else {
        Some(percents.iter().sum::<f64>() / percents.len() as f64)
    };

    let all_complete = contributions_count > 0 && completed_count == contributions_count;

    let macro_percent_strict = if contributions_count == 0 {
        None
    } else if all_complete {
        Some(100.0)
    } else {
        let average = round2(average_percent.unwrap_or(0.0));
        Some(average.clamp(0.0, INCOMPLETE_PERCENT_CAP))
    };

    let has = |light: TrafficLight| contributions.iter().any(|c| light_of(c) == Some(light));
    let macro_traffic_light = if with_updates_count == 0 {
        None
    } else if has(TrafficLight::Red) {
        Some(TrafficLight::Red)
    } else if has(TrafficLight::Amber) {
        Some(TrafficLight::Amber)
    } else if all_complete {
        Some(TrafficLight::Green)
    } else {
        // Some green, some never reported.
        Some(TrafficLight::Amber)
    };

    MacroRollup {
        macro_challenge,
        contributions_count,
        contributing_areas_count,
        missing_areas_count,
        with_updates_count,
        completed_count,
        risk_count,
        average_percent,
        macro_percent_strict,
        macro_traffic_light,
    }
}

/// Presentation order: most at-risk first, then widest participation,
/// then most advanced. Macros without contributions go last.
pub fn sort_rollups<M>(rollups: &mut [MacroRollup<M>]) {
    rollups.sort_by(|a, b| {
        b.risk_count
            .cmp(&a.risk_count)
            .then_with(|| b.contributing_areas_count.cmp(&a.contributing_areas_count))
            .then_with(|| {
                let ap = a.macro_percent_strict.unwrap_or(-1.0);
                let bp = b.macro_percent_strict.unwrap_or(-1.0);
                bp.partial_cmp(&ap).unwrap_or(Ordering::Equal)
            })
    });
}
