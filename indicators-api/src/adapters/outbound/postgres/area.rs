use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{
    models::{Area, AreaDraft, AreaId, AreaMembership, AreaRef, AreaUpdate, ProfileId},
    ports::outbound::AreaRepository,
    TrackingError,
};

use super::db_error;

#[derive(sqlx::FromRow)]
struct AreaRow {
    id: Uuid,
    name: String,
    kind: String,
    active: bool,
    created_at: OffsetDateTime,
}

impl From<AreaRow> for Area {
    fn from(row: AreaRow) -> Self {
        Self {
            id: AreaId::new(row.id),
            name: row.name,
            kind: row.kind,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    name: String,
    kind: String,
    is_primary: bool,
}

pub struct PostgresAreaRepository {
    pool: PgPool,
}

impl PostgresAreaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AreaRepository for PostgresAreaRepository {
    async fn list_areas(&self, active_only: bool) -> Result<Vec<Area>, TrackingError> {
        let rows = sqlx::query_as::<_, AreaRow>(
            r#"
            SELECT id, name, kind, active, created_at
            FROM areas
            WHERE active OR NOT $1
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Area::from).collect())
    }

    async fn get_area(&self, id: &AreaId) -> Result<Option<Area>, TrackingError> {
        let row = sqlx::query_as::<_, AreaRow>(
            r#"
            SELECT id, name, kind, active, created_at
            FROM areas
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Area::from))
    }

    async fn create_area(&self, draft: &AreaDraft) -> Result<Area, TrackingError> {
        let row = sqlx::query_as::<_, AreaRow>(
            r#"
            INSERT INTO areas (id, name, kind)
            VALUES ($1, $2, $3)
            RETURNING id, name, kind, active, created_at
            "#,
        )
        .bind(Uuid::from(AreaId::generate()))
        .bind(&draft.name)
        .bind(&draft.kind)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn update_area(&self, id: &AreaId, update: &AreaUpdate) -> Result<Area, TrackingError> {
        let row = sqlx::query_as::<_, AreaRow>(
            r#"
            UPDATE areas
            SET name = $2,
                kind = $3,
                active = COALESCE($4, active)
            WHERE id = $1
            RETURNING id, name, kind, active, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&update.name)
        .bind(&update.kind)
        .bind(update.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Area::from)
            .ok_or_else(|| TrackingError::not_found("area"))
    }

    async fn deactivate_area(&self, id: &AreaId) -> Result<(), TrackingError> {
        let result = sqlx::query(
            r#"
            UPDATE areas
            SET active = FALSE
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(TrackingError::not_found("area"));
        }

        Ok(())
    }

    async fn memberships(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Vec<AreaMembership>, TrackingError> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT areas.id, areas.name, areas.kind, profile_areas.is_primary
            FROM profile_areas
            JOIN areas ON areas.id = profile_areas.area_id
            WHERE profile_areas.profile_id = $1
            ORDER BY profile_areas.is_primary DESC, areas.name
            "#,
        )
        .bind(profile_id.as_i32())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AreaMembership {
                area: AreaRef {
                    id: AreaId::new(row.id),
                    name: row.name,
                    kind: row.kind,
                },
                is_primary: row.is_primary,
            })
            .collect())
    }
}
