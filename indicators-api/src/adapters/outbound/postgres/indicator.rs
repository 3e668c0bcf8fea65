use async_trait::async_trait;
use progress_core::next_ordinals;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{
    models::{
        AreaContribution, AreaId, AreaRef, ContributionId, ContributionUpdate, IndicatorFilter,
        MacroId, NewContributionBatch, NewOwnIndicatorBatch, OwnIndicator, OwnIndicatorId,
    },
    ports::outbound::IndicatorRepository,
    TrackingError,
};

use super::db_error;

const CONTRIBUTION_SELECT: &str = r#"
    SELECT c.id, c.macro_id, c.area_id, c.year, c.ordinal, c.challenge, c.indicator,
           c.target_value, c.target_description, c.active, c.created_at,
           a.name AS area_name, a.kind AS area_kind, m.challenge AS macro_challenge
    FROM area_contributions c
    LEFT JOIN areas a ON a.id = c.area_id
    LEFT JOIN macro_challenges m ON m.id = c.macro_id
"#;

const OWN_INDICATOR_SELECT: &str = r#"
    SELECT o.id, o.area_id, o.year, o.ordinal, o.challenge, o.indicator,
           o.target_value, o.target_description, o.active, o.created_at,
           a.name AS area_name, a.kind AS area_kind
    FROM area_own_indicators o
    LEFT JOIN areas a ON a.id = o.area_id
"#;

#[derive(sqlx::FromRow)]
struct ContributionRow {
    id: Uuid,
    macro_id: Uuid,
    area_id: Uuid,
    year: i32,
    ordinal: i32,
    challenge: String,
    indicator: String,
    target_value: Option<f64>,
    target_description: Option<String>,
    active: bool,
    created_at: OffsetDateTime,
    area_name: Option<String>,
    area_kind: Option<String>,
    macro_challenge: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OwnIndicatorRow {
    id: Uuid,
    area_id: Uuid,
    year: i32,
    ordinal: i32,
    challenge: String,
    indicator: String,
    target_value: Option<f64>,
    target_description: Option<String>,
    active: bool,
    created_at: OffsetDateTime,
    area_name: Option<String>,
    area_kind: Option<String>,
}

/// The joined area, present only when the join matched.
fn joined_area(id: Uuid, name: Option<String>, kind: Option<String>) -> Option<AreaRef> {
    name.map(|name| AreaRef {
        id: AreaId::new(id),
        name,
        kind: kind.unwrap_or_default(),
    })
}

impl From<ContributionRow> for AreaContribution {
    fn from(row: ContributionRow) -> Self {
        Self {
            id: ContributionId::new(row.id),
            macro_id: MacroId::new(row.macro_id),
            area_id: AreaId::new(row.area_id),
            year: row.year,
            ordinal: row.ordinal,
            challenge: row.challenge,
            indicator: row.indicator,
            target_value: row.target_value,
            target_description: row.target_description,
            active: row.active,
            created_at: row.created_at,
            area: joined_area(row.area_id, row.area_name, row.area_kind),
            macro_challenge: row.macro_challenge,
        }
    }
}

impl From<OwnIndicatorRow> for OwnIndicator {
    fn from(row: OwnIndicatorRow) -> Self {
        Self {
            id: OwnIndicatorId::new(row.id),
            area_id: AreaId::new(row.area_id),
            year: row.year,
            ordinal: row.ordinal,
            challenge: row.challenge,
            indicator: row.indicator,
            target_value: row.target_value,
            target_description: row.target_description,
            active: row.active,
            created_at: row.created_at,
            area: joined_area(row.area_id, row.area_name, row.area_kind),
        }
    }
}

fn area_uuids(filter: &IndicatorFilter) -> Option<Vec<Uuid>> {
    filter
        .area_ids
        .as_ref()
        .map(|ids| ids.iter().map(|id| Uuid::from(*id)).collect())
}

/// Serialise ordinal allocation for one group until the transaction ends.
async fn lock_group(tx: &mut Transaction<'_, Postgres>, key: &str) -> Result<(), TrackingError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(&mut **tx)
        .await
        .map_err(db_error)?;
    Ok(())
}

pub struct PostgresIndicatorRepository {
    pool: PgPool,
}

impl PostgresIndicatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn contributions_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<AreaContribution>, TrackingError> {
        let rows = sqlx::query_as::<_, ContributionRow>(&format!(
            "{CONTRIBUTION_SELECT} WHERE c.id = ANY($1) ORDER BY c.ordinal"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(AreaContribution::from).collect())
    }

    async fn own_indicators_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<OwnIndicator>, TrackingError> {
        let rows = sqlx::query_as::<_, OwnIndicatorRow>(&format!(
            "{OWN_INDICATOR_SELECT} WHERE o.id = ANY($1) ORDER BY o.ordinal"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(OwnIndicator::from).collect())
    }
}

#[async_trait]
impl IndicatorRepository for PostgresIndicatorRepository {
    async fn list_contributions(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<AreaContribution>, TrackingError> {
        let rows = sqlx::query_as::<_, ContributionRow>(&format!(
            r#"
            {CONTRIBUTION_SELECT}
            WHERE ($1::INTEGER IS NULL OR c.year = $1)
              AND ($2::UUID[] IS NULL OR c.area_id = ANY($2))
              AND ($3::UUID IS NULL OR c.macro_id = $3)
              AND (c.active OR NOT $4)
            ORDER BY m.challenge, a.name, c.ordinal
            "#
        ))
        .bind(filter.year)
        .bind(area_uuids(filter))
        .bind(filter.macro_id.map(Uuid::from))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(AreaContribution::from).collect())
    }

    async fn get_contribution(
        &self,
        id: &ContributionId,
    ) -> Result<Option<AreaContribution>, TrackingError> {
        let row = sqlx::query_as::<_, ContributionRow>(&format!(
            "{CONTRIBUTION_SELECT} WHERE c.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(AreaContribution::from))
    }

    async fn create_contributions(
        &self,
        batch: &NewContributionBatch,
    ) -> Result<Vec<AreaContribution>, TrackingError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        lock_group(
            &mut tx,
            &format!(
                "area_contributions:{}:{}:{}",
                batch.macro_id, batch.area_id, batch.year
            ),
        )
        .await?;

        let current_max = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT MAX(ordinal)
            FROM area_contributions
            WHERE macro_id = $1 AND area_id = $2 AND year = $3
            "#,
        )
        .bind(batch.macro_id.as_uuid())
        .bind(batch.area_id.as_uuid())
        .bind(batch.year)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        let mut ids = Vec::with_capacity(batch.items.len());
        for (ordinal, item) in next_ordinals(current_max, batch.items.len()).zip(&batch.items) {
            let id = Uuid::from(ContributionId::generate());
            sqlx::query(
                r#"
                INSERT INTO area_contributions (
                    id, macro_id, area_id, year, ordinal, challenge, indicator,
                    target_value, target_description, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(id)
            .bind(batch.macro_id.as_uuid())
            .bind(batch.area_id.as_uuid())
            .bind(batch.year)
            .bind(ordinal)
            .bind(&item.challenge)
            .bind(&item.indicator)
            .bind(item.target_value)
            .bind(&item.target_description)
            .bind(batch.created_by.map(|p| p.as_i32()))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
            ids.push(id);
        }

        tx.commit().await.map_err(db_error)?;

        self.contributions_by_ids(&ids).await
    }

    async fn update_contribution(
        &self,
        id: &ContributionId,
        update: &ContributionUpdate,
    ) -> Result<AreaContribution, TrackingError> {
        let result = sqlx::query(
            r#"
            UPDATE area_contributions
            SET challenge = $2,
                indicator = $3,
                target_value = $4,
                target_description = $5,
                ordinal = COALESCE($6, ordinal)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&update.draft.challenge)
        .bind(&update.draft.indicator)
        .bind(update.draft.target_value)
        .bind(&update.draft.target_description)
        .bind(update.ordinal)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(TrackingError::not_found("contribution"));
        }

        self.get_contribution(id)
            .await?
            .ok_or_else(|| TrackingError::not_found("contribution"))
    }

    async fn set_contribution_active(
        &self,
        id: &ContributionId,
        active: bool,
    ) -> Result<(), TrackingError> {
        let result = sqlx::query("UPDATE area_contributions SET active = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(TrackingError::not_found("contribution"));
        }

        Ok(())
    }

    async fn list_own_indicators(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<OwnIndicator>, TrackingError> {
        let rows = sqlx::query_as::<_, OwnIndicatorRow>(&format!(
            r#"
            {OWN_INDICATOR_SELECT}
            WHERE ($1::INTEGER IS NULL OR o.year = $1)
              AND ($2::UUID[] IS NULL OR o.area_id = ANY($2))
              AND (o.active OR NOT $3)
            ORDER BY a.name, o.ordinal
            "#
        ))
        .bind(filter.year)
        .bind(area_uuids(filter))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(OwnIndicator::from).collect())
    }

    async fn get_own_indicator(
        &self,
        id: &OwnIndicatorId,
    ) -> Result<Option<OwnIndicator>, TrackingError> {
        let row = sqlx::query_as::<_, OwnIndicatorRow>(&format!(
            "{OWN_INDICATOR_SELECT} WHERE o.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(OwnIndicator::from))
    }

    async fn create_own_indicators(
        &self,
        batch: &NewOwnIndicatorBatch,
    ) -> Result<Vec<OwnIndicator>, TrackingError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        lock_group(
            &mut tx,
            &format!("area_own_indicators:{}:{}", batch.area_id, batch.year),
        )
        .await?;

        let current_max = sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT MAX(ordinal)
            FROM area_own_indicators
            WHERE area_id = $1 AND year = $2
            "#,
        )
        .bind(batch.area_id.as_uuid())
        .bind(batch.year)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        let mut ids = Vec::with_capacity(batch.items.len());
        for (ordinal, item) in next_ordinals(current_max, batch.items.len()).zip(&batch.items) {
            let id = Uuid::from(OwnIndicatorId::generate());
            sqlx::query(
                r#"
                INSERT INTO area_own_indicators (
                    id, area_id, year, ordinal, challenge, indicator,
                    target_value, target_description, created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(id)
            .bind(batch.area_id.as_uuid())
            .bind(batch.year)
            .bind(ordinal)
            .bind(&item.challenge)
            .bind(&item.indicator)
            .bind(item.target_value)
            .bind(&item.target_description)
            .bind(batch.created_by.map(|p| p.as_i32()))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
            ids.push(id);
        }

        tx.commit().await.map_err(db_error)?;

        self.own_indicators_by_ids(&ids).await
    }
}
