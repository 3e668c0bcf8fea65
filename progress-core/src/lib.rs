//! Progress aggregation and traffic-light classification.
//!
//! Everything in this crate is a pure function over already-fetched rows:
//! the evaluator validates a new report against its target, the roll-up
//! folds the latest state of many contributions into one macro figure and
//! the alert ranking orders at-risk items for display.

mod alerts;
mod evaluator;
mod latest;
mod ordinal;
mod rollup;
mod summary;
mod traffic_light;

pub use alerts::*;
pub use evaluator::*;
pub use latest::*;
pub use ordinal::*;
pub use rollup::*;
pub use summary::*;
pub use traffic_light::*;

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
