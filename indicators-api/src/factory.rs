//! Composition root: the only place that wires concrete outbound adapters
//! into the domain services.

use std::sync::Arc;

use sqlx::PgPool;
use time::Duration;
use url::Url;

use crate::{
    adapters::outbound::{
        postgres::{
            PostgresAreaRepository, PostgresIndicatorRepository, PostgresMacroRepository,
            PostgresReportRepository,
        },
        storage::HttpEvidenceStore,
    },
    app_state::AppState,
    config::Settings,
    domain::services::{
        AdministrationServiceImpl, DashboardServiceImpl, EvidenceServiceImpl,
        ReportingServiceImpl,
    },
    repositories::ProfileRepositoryImpl,
};

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("invalid application url: {0}")]
    AppUrl(url::ParseError),
    #[error("invalid storage url: {0}")]
    StorageUrl(url::ParseError),
}

pub fn build_app_state(pool: PgPool, config: &Settings) -> Result<AppState, FactoryError> {
    let app_url = Url::parse(&config.application.app_url).map_err(FactoryError::AppUrl)?;

    let areas = Arc::new(PostgresAreaRepository::new(pool.clone()));
    let macros = Arc::new(PostgresMacroRepository::new(pool.clone()));
    let indicators = Arc::new(PostgresIndicatorRepository::new(pool.clone()));
    let reports = Arc::new(PostgresReportRepository::new(pool.clone()));
    let store =
        Arc::new(HttpEvidenceStore::new(&config.storage).map_err(FactoryError::StorageUrl)?);

    let signed_url_ttl =
        Duration::seconds(i64::try_from(config.storage.signed_url_ttl_secs).unwrap_or(60));

    Ok(AppState {
        app_url,
        profile_repo: Arc::new(ProfileRepositoryImpl::new(pool)),
        reporting_service: Arc::new(ReportingServiceImpl::new(
            indicators.clone(),
            reports.clone(),
            areas.clone(),
        )),
        administration_service: Arc::new(AdministrationServiceImpl::new(
            areas.clone(),
            macros.clone(),
            indicators.clone(),
        )),
        dashboard_service: Arc::new(DashboardServiceImpl::new(
            areas.clone(),
            macros,
            indicators,
            reports,
        )),
        evidence_service: Arc::new(EvidenceServiceImpl::new(store, areas, signed_url_ttl)),
    })
}
