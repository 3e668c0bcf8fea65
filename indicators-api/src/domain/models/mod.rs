mod area;
mod dashboard;
mod ids;
mod indicator;
mod macro_challenge;
mod report;

pub use area::*;
pub use dashboard::*;
pub use ids::*;
pub use indicator::*;
pub use macro_challenge::*;
pub use report::*;
