use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{
    models::{Goal, IndicatorKind, MacroChallenge, MacroChallengeDraft, MacroId, ProfileId},
    ports::outbound::MacroRepository,
    TrackingError,
};

use super::db_error;

const MACRO_COLUMNS: &str = r#"
    id, year, responsible_area, challenge, indicator, indicator_kind,
    goal_primary_value, goal_primary_description,
    goal_secondary_value, goal_secondary_description,
    created_by, created_at
"#;

#[derive(sqlx::FromRow)]
struct MacroRow {
    id: Uuid,
    year: i32,
    responsible_area: String,
    challenge: String,
    indicator: String,
    indicator_kind: String,
    goal_primary_value: Option<f64>,
    goal_primary_description: Option<String>,
    goal_secondary_value: Option<f64>,
    goal_secondary_description: Option<String>,
    created_by: Option<i32>,
    created_at: OffsetDateTime,
}

impl From<MacroRow> for MacroChallenge {
    fn from(row: MacroRow) -> Self {
        Self {
            id: MacroId::new(row.id),
            year: row.year,
            responsible_area: row.responsible_area,
            challenge: row.challenge,
            indicator: row.indicator,
            indicator_kind: row.indicator_kind.parse().unwrap_or_default(),
            goal_primary: Goal {
                value: row.goal_primary_value,
                description: row.goal_primary_description,
            },
            goal_secondary: Goal {
                value: row.goal_secondary_value,
                description: row.goal_secondary_description,
            },
            created_by: row.created_by.map(ProfileId::new),
            created_at: row.created_at,
        }
    }
}

fn kind_column(kind: IndicatorKind) -> String {
    kind.to_string()
}

pub struct PostgresMacroRepository {
    pool: PgPool,
}

impl PostgresMacroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MacroRepository for PostgresMacroRepository {
    async fn list_macros(&self, year: i32) -> Result<Vec<MacroChallenge>, TrackingError> {
        let rows = sqlx::query_as::<_, MacroRow>(&format!(
            "SELECT {MACRO_COLUMNS} FROM macro_challenges WHERE year = $1 ORDER BY created_at"
        ))
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(MacroChallenge::from).collect())
    }

    async fn get_macro(&self, id: &MacroId) -> Result<Option<MacroChallenge>, TrackingError> {
        let row = sqlx::query_as::<_, MacroRow>(&format!(
            "SELECT {MACRO_COLUMNS} FROM macro_challenges WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(MacroChallenge::from))
    }

    async fn create_macro(
        &self,
        draft: &MacroChallengeDraft,
        created_by: Option<ProfileId>,
    ) -> Result<MacroChallenge, TrackingError> {
        let row = sqlx::query_as::<_, MacroRow>(&format!(
            r#"
            INSERT INTO macro_challenges (
                id, year, responsible_area, challenge, indicator, indicator_kind,
                goal_primary_value, goal_primary_description,
                goal_secondary_value, goal_secondary_description, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {MACRO_COLUMNS}
            "#
        ))
        .bind(Uuid::from(MacroId::generate()))
        .bind(draft.year)
        .bind(&draft.responsible_area)
        .bind(&draft.challenge)
        .bind(&draft.indicator)
        .bind(kind_column(draft.indicator_kind))
        .bind(draft.goal_primary.value)
        .bind(&draft.goal_primary.description)
        .bind(draft.goal_secondary.value)
        .bind(&draft.goal_secondary.description)
        .bind(created_by.map(|id| id.as_i32()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn update_macro(
        &self,
        id: &MacroId,
        draft: &MacroChallengeDraft,
    ) -> Result<MacroChallenge, TrackingError> {
        let row = sqlx::query_as::<_, MacroRow>(&format!(
            r#"
            UPDATE macro_challenges
            SET year = $2,
                responsible_area = $3,
                challenge = $4,
                indicator = $5,
                indicator_kind = $6,
                goal_primary_value = $7,
                goal_primary_description = $8,
                goal_secondary_value = $9,
                goal_secondary_description = $10
            WHERE id = $1
            RETURNING {MACRO_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(draft.year)
        .bind(&draft.responsible_area)
        .bind(&draft.challenge)
        .bind(&draft.indicator)
        .bind(kind_column(draft.indicator_kind))
        .bind(draft.goal_primary.value)
        .bind(&draft.goal_primary.description)
        .bind(draft.goal_secondary.value)
        .bind(&draft.goal_secondary.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(MacroChallenge::from)
            .ok_or_else(|| TrackingError::not_found("macro challenge"))
    }

    async fn delete_macro(&self, id: &MacroId) -> Result<(), TrackingError> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM area_contributions WHERE macro_id = $1)
            "#,
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        if referenced {
            return Err(TrackingError::Conflict(
                "macro challenge still has contributions".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM macro_challenges WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(TrackingError::not_found("macro challenge"));
        }

        Ok(())
    }
}
