use std::ops::Deref;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    domain::{Actor, Profile},
    routes::{error::ErrorCode, ApiError},
};

use super::AuthSession;

/// Extracts the signed-in [`Profile`] from the session, whatever its role.
/// Returns 401 Unauthorized if no one is logged in.
///
/// Safe to log, `Profile`'s `Debug` impl redacts the access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    profile: Profile,
}

impl AuthUser {
    pub fn into_profile(self) -> Profile {
        self.profile
    }
}

impl Deref for AuthUser {
    type Target = Profile;

    fn deref(&self) -> &Self::Target {
        &self.profile
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthSession: FromRequestParts<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_session = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::unauthorized("Not authenticated"))?;

        let profile = auth_session
            .user
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        Ok(AuthUser { profile })
    }
}

/// An approved member or admin. Pending profiles are rejected with 403.
#[derive(Debug, Clone)]
pub struct MemberUser {
    profile: Profile,
}

impl MemberUser {
    pub fn actor(&self) -> Actor {
        self.profile.actor()
    }
}

impl Deref for MemberUser {
    type Target = Profile;

    fn deref(&self) -> &Self::Target {
        &self.profile
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MemberUser
where
    S: Send + Sync,
    AuthSession: FromRequestParts<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let profile = AuthUser::from_request_parts(parts, state)
            .await?
            .into_profile();

        if !profile.role.is_approved() {
            return Err(ApiError::forbidden("pending approval").with_code(ErrorCode::PendingApproval));
        }

        Ok(MemberUser { profile })
    }
}

/// An admin. Everyone else is rejected with 403.
#[derive(Debug, Clone)]
pub struct AdminUser {
    profile: Profile,
}

impl AdminUser {
    pub fn actor(&self) -> Actor {
        self.profile.actor()
    }
}

impl Deref for AdminUser {
    type Target = Profile;

    fn deref(&self) -> &Self::Target {
        &self.profile
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AuthSession: FromRequestParts<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let profile = AuthUser::from_request_parts(parts, state)
            .await?
            .into_profile();

        if !profile.role.is_admin() {
            return Err(ApiError::forbidden("admin role required"));
        }

        Ok(AdminUser { profile })
    }
}
