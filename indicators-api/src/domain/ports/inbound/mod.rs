mod administration;
mod dashboard;
mod evidence;
mod reporting;

pub use administration::*;
pub use dashboard::*;
pub use evidence::*;
pub use reporting::*;
