use std::ops::RangeInclusive;

/// Ordinals for `count` new rows appended to a group whose highest ordinal
/// is `current_max` (`None` for an empty group).
///
/// Ordinals continue after the maximum; gaps left by deleted rows are never
/// filled.
pub fn next_ordinals(current_max: Option<i32>, count: usize) -> RangeInclusive<i32> {
    let base = current_max.unwrap_or(0);
    let count = i32::try_from(count).unwrap_or(i32::MAX - base);
    (base + 1)..=(base + count)
}
