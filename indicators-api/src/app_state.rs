use std::sync::Arc;

use url::Url;

use crate::{
    domain::ports::inbound::{
        AdministrationService, DashboardService, EvidenceService, ReportingService,
    },
    repositories::ProfileRepositoryImpl,
};

#[derive(Clone)]
pub struct AppState {
    pub app_url: Url,
    pub profile_repo: Arc<ProfileRepositoryImpl>,
    pub reporting_service: Arc<dyn ReportingService>,
    pub administration_service: Arc<dyn AdministrationService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    pub evidence_service: Arc<dyn EvidenceService>,
}
