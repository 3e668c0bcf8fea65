use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    models::{AreaId, AreaRef, ProfileId},
    Profile, ProfileWithAreas, Role,
};

use super::repo_error::RepositoryError;

pub trait ProfileRepository {
    async fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError>;
    /// Insert a first-time profile as pending, or refresh an existing one by email.
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<Profile, RepositoryError>;
    async fn list_profiles(&self) -> Result<Vec<ProfileWithAreas>, RepositoryError>;
    async fn primary_area(&self, id: ProfileId) -> Result<Option<AreaRef>, RepositoryError>;
    /// Link the profile to an area and grant it a role.
    async fn approve(
        &self,
        id: ProfileId,
        area_id: AreaId,
        role: Role,
    ) -> Result<Profile, RepositoryError>;
    async fn set_role(&self, id: ProfileId, role: Role) -> Result<Profile, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i32,
    email: String,
    full_name: String,
    role: String,
    access_token: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: ProfileId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            role: Role::from(row.role),
            access_token: row.access_token,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileAreaRow {
    profile_id: i32,
    area_id: Uuid,
    name: String,
    kind: String,
    is_primary: bool,
}

#[derive(Clone)]
pub struct ProfileRepositoryImpl {
    pool: PgPool,
}

impl ProfileRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_existing(&self, id: ProfileId) -> Result<Profile, RepositoryError> {
        self.get_profile(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("profile {id}")))
    }
}

impl ProfileRepository for ProfileRepositoryImpl {
    async fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, full_name, role, access_token
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (email, full_name, access_token)
            VALUES ($1, $2, $3)
            ON CONFLICT(email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                access_token = EXCLUDED.access_token
            RETURNING id, email, full_name, role, access_token
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.access_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_profiles(&self) -> Result<Vec<ProfileWithAreas>, RepositoryError> {
        let profiles = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, full_name, role, access_token
            FROM profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let links = sqlx::query_as::<_, ProfileAreaRow>(
            r#"
            SELECT profile_areas.profile_id, areas.id AS area_id, areas.name, areas.kind,
                   profile_areas.is_primary
            FROM profile_areas
            JOIN areas ON areas.id = profile_areas.area_id
            ORDER BY profile_areas.is_primary DESC, areas.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut links_by_profile: HashMap<i32, Vec<ProfileAreaRow>> = HashMap::new();
        for link in links {
            links_by_profile.entry(link.profile_id).or_default().push(link);
        }

        Ok(profiles
            .into_iter()
            .map(|row| {
                let links = links_by_profile.remove(&row.id).unwrap_or_default();
                let primary_area = links
                    .iter()
                    .find(|link| link.is_primary)
                    .map(area_ref_of);
                ProfileWithAreas {
                    profile: row.into(),
                    primary_area,
                    areas: links.iter().map(area_ref_of).collect(),
                }
            })
            .collect())
    }

    async fn primary_area(&self, id: ProfileId) -> Result<Option<AreaRef>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileAreaRow>(
            r#"
            SELECT profile_areas.profile_id, areas.id AS area_id, areas.name, areas.kind,
                   profile_areas.is_primary
            FROM profile_areas
            JOIN areas ON areas.id = profile_areas.area_id
            WHERE profile_areas.profile_id = $1
            ORDER BY profile_areas.is_primary DESC, areas.name
            LIMIT 1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(area_ref_of))
    }

    async fn approve(
        &self,
        id: ProfileId,
        area_id: AreaId,
        role: Role,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // The first linked area becomes the primary one; an existing link is kept as is.
        sqlx::query(
            r#"
            INSERT INTO profile_areas (profile_id, area_id, is_primary)
            VALUES (
                $1, $2,
                NOT EXISTS (SELECT 1 FROM profile_areas WHERE profile_id = $1 AND is_primary)
            )
            ON CONFLICT (profile_id, area_id) DO NOTHING
            "#,
        )
        .bind(id.as_i32())
        .bind(Uuid::from(area_id))
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE profiles
            SET role = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(role.to_string())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("profile {id}")));
        }

        tx.commit().await?;
        self.fetch_existing(id).await
    }

    async fn set_role(&self, id: ProfileId, role: Role) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET role = $2
            WHERE id = $1
            RETURNING id, email, full_name, role, access_token
            "#,
        )
        .bind(id.as_i32())
        .bind(role.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("profile {id}")))
    }
}

fn area_ref_of(row: &ProfileAreaRow) -> AreaRef {
    AreaRef {
        id: AreaId::new(row.area_id),
        name: row.name.clone(),
        kind: row.kind.clone(),
    }
}

pub struct NewProfile {
    email: String,
    full_name: String,
    access_token: String,
}

impl NewProfile {
    pub fn new(email: String, full_name: String, access_token: String) -> Self {
        Self {
            email: email.to_lowercase(),
            full_name,
            access_token,
        }
    }
}
