mod area;
mod evidence_store;
mod indicator;
mod macro_challenge;
#[cfg(test)]
mod mock;
mod report;

pub use area::*;
pub use evidence_store::*;
pub use indicator::*;
pub use macro_challenge::*;
#[cfg(test)]
pub use mock::MockStore;
pub use report::*;
