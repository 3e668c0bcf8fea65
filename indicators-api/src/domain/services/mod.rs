mod administration;
mod dashboard;
mod evidence;
mod reporting;

pub use administration::AdministrationServiceImpl;
pub use dashboard::DashboardServiceImpl;
pub use evidence::{EvidenceServiceImpl, MAX_EVIDENCE_SIZE};
pub use reporting::ReportingServiceImpl;
