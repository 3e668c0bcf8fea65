use std::collections::HashMap;

use async_trait::async_trait;
use progress_core::{LatestState, TrafficLight};
use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::{
    models::{
        ContributionId, EvidenceReport, NewProgressReport, OwnIndicatorId, ProfileId,
        ProgressReport, ReportId, ReportTarget,
    },
    ports::outbound::ReportRepository,
    TrackingError,
};

use super::db_error;

const CONTRIBUTION_REPORT_COLUMNS: &str = r#"
    id, contribution_id AS target_id, period_end AS report_date, percent, current_value,
    traffic_light, comment, evidence_path, created_by, created_at
"#;

const OWN_REPORT_COLUMNS: &str = r#"
    id, indicator_id AS target_id, report_date, percent, current_value,
    traffic_light, comment, evidence_path, created_by, created_at
"#;

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    target_id: Uuid,
    report_date: Date,
    percent: f64,
    current_value: Option<f64>,
    traffic_light: String,
    comment: String,
    evidence_path: Option<String>,
    created_by: Option<i32>,
    created_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct LatestRow {
    target_id: Uuid,
    report_date: Date,
    percent: f64,
    current_value: Option<f64>,
    traffic_light: String,
}

#[derive(sqlx::FromRow)]
struct EvidenceRow {
    id: Uuid,
    contribution_id: Uuid,
    evidence_path: String,
    traffic_light: String,
    created_at: OffsetDateTime,
    indicator: Option<String>,
    area_name: Option<String>,
    macro_challenge: Option<String>,
}

fn parse_light(value: &str) -> Result<TrafficLight, TrackingError> {
    value
        .parse()
        .map_err(|_| TrackingError::storage(format!("unknown traffic light '{value}'")))
}

impl ReportRow {
    fn into_report(
        self,
        target: impl FnOnce(Uuid) -> ReportTarget,
    ) -> Result<ProgressReport, TrackingError> {
        Ok(ProgressReport {
            id: ReportId::new(self.id),
            target: target(self.target_id),
            report_date: self.report_date,
            percent: self.percent,
            current_value: self.current_value,
            traffic_light: parse_light(&self.traffic_light)?,
            comment: self.comment,
            evidence_path: self.evidence_path,
            created_by: self.created_by.map(ProfileId::new),
            created_at: self.created_at,
        })
    }
}

impl LatestRow {
    fn into_state<K>(self, id: K) -> Result<LatestState<K>, TrackingError> {
        let state = LatestState::new(id)
            .with_percent(self.percent)
            .with_traffic_light(parse_light(&self.traffic_light)?)
            .with_period_end(self.report_date);

        Ok(match self.current_value {
            Some(value) => state.with_current_value(value),
            None => state,
        })
    }
}

fn contribution_target(id: Uuid) -> ReportTarget {
    ReportTarget::Contribution(ContributionId::new(id))
}

fn own_target(id: Uuid) -> ReportTarget {
    ReportTarget::OwnIndicator(OwnIndicatorId::new(id))
}

pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn append_report(
        &self,
        report: &NewProgressReport,
    ) -> Result<ProgressReport, TrackingError> {
        let evaluated = &report.evaluated;
        let created_by = report.created_by.map(|id| id.as_i32());

        let row = match report.target {
            ReportTarget::Contribution(id) => {
                sqlx::query_as::<_, ReportRow>(&format!(
                    r#"
                    INSERT INTO progress_updates (
                        id, contribution_id, period_start, period_end, percent, current_value,
                        traffic_light, comment, evidence_path, created_by
                    )
                    VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, $9)
                    RETURNING {CONTRIBUTION_REPORT_COLUMNS}
                    "#
                ))
                .bind(report.id.as_uuid())
                .bind(id.as_uuid())
                .bind(report.report_date)
                .bind(evaluated.percent)
                .bind(evaluated.current_value)
                .bind(evaluated.traffic_light.to_string())
                .bind(&evaluated.comment)
                .bind(&report.evidence_path)
                .bind(created_by)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?
            }
            ReportTarget::OwnIndicator(id) => {
                sqlx::query_as::<_, ReportRow>(&format!(
                    r#"
                    INSERT INTO area_own_updates (
                        id, indicator_id, report_date, percent, current_value,
                        traffic_light, comment, evidence_path, created_by
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    RETURNING {OWN_REPORT_COLUMNS}
                    "#
                ))
                .bind(report.id.as_uuid())
                .bind(id.as_uuid())
                .bind(report.report_date)
                .bind(evaluated.percent)
                .bind(evaluated.current_value)
                .bind(evaluated.traffic_light.to_string())
                .bind(&evaluated.comment)
                .bind(&report.evidence_path)
                .bind(created_by)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?
            }
        };

        let target = report.target;
        row.into_report(|_| target)
    }

    async fn report_history(
        &self,
        target: &ReportTarget,
    ) -> Result<Vec<ProgressReport>, TrackingError> {
        let (query, id, to_target): (String, Uuid, fn(Uuid) -> ReportTarget) = match target {
            ReportTarget::Contribution(id) => (
                format!(
                    "SELECT {CONTRIBUTION_REPORT_COLUMNS} FROM progress_updates \
                     WHERE contribution_id = $1 ORDER BY created_at DESC, id DESC"
                ),
                Uuid::from(*id),
                contribution_target,
            ),
            ReportTarget::OwnIndicator(id) => (
                format!(
                    "SELECT {OWN_REPORT_COLUMNS} FROM area_own_updates \
                     WHERE indicator_id = $1 ORDER BY created_at DESC, id DESC"
                ),
                Uuid::from(*id),
                own_target,
            ),
        };

        let rows = sqlx::query_as::<_, ReportRow>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter()
            .map(|row| row.into_report(to_target))
            .collect()
    }

    async fn latest_contribution_states(
        &self,
        ids: &[ContributionId],
    ) -> Result<HashMap<ContributionId, LatestState<ContributionId>>, TrackingError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = ids.iter().map(|id| Uuid::from(*id)).collect::<Vec<_>>();
        let rows = sqlx::query_as::<_, LatestRow>(
            r#"
            SELECT DISTINCT ON (contribution_id)
                contribution_id AS target_id, period_end AS report_date, percent,
                current_value, traffic_light
            FROM progress_updates
            WHERE contribution_id = ANY($1)
            ORDER BY contribution_id, created_at DESC, id DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                let id = ContributionId::new(row.target_id);
                Ok((id, row.into_state(id)?))
            })
            .collect()
    }

    async fn latest_own_states(
        &self,
        ids: &[OwnIndicatorId],
    ) -> Result<HashMap<OwnIndicatorId, LatestState<OwnIndicatorId>>, TrackingError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = ids.iter().map(|id| Uuid::from(*id)).collect::<Vec<_>>();
        let rows = sqlx::query_as::<_, LatestRow>(
            r#"
            SELECT DISTINCT ON (indicator_id)
                indicator_id AS target_id, report_date, percent, current_value, traffic_light
            FROM area_own_updates
            WHERE indicator_id = ANY($1)
            ORDER BY indicator_id, created_at DESC, id DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                let id = OwnIndicatorId::new(row.target_id);
                Ok((id, row.into_state(id)?))
            })
            .collect()
    }

    async fn recent_evidence(&self, limit: usize) -> Result<Vec<EvidenceReport>, TrackingError> {
        let rows = sqlx::query_as::<_, EvidenceRow>(
            r#"
            SELECT u.id, u.contribution_id, u.evidence_path, u.traffic_light, u.created_at,
                   c.indicator, a.name AS area_name, m.challenge AS macro_challenge
            FROM progress_updates u
            LEFT JOIN area_contributions c ON c.id = u.contribution_id
            LEFT JOIN areas a ON a.id = c.area_id
            LEFT JOIN macro_challenges m ON m.id = c.macro_id
            WHERE u.evidence_path IS NOT NULL
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(EvidenceReport {
                    report_id: ReportId::new(row.id),
                    contribution_id: ContributionId::new(row.contribution_id),
                    evidence_path: row.evidence_path,
                    traffic_light: parse_light(&row.traffic_light)?,
                    created_at: row.created_at,
                    indicator: row.indicator,
                    area_name: row.area_name,
                    macro_challenge: row.macro_challenge,
                })
            })
            .collect()
    }
}
