use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId as SessionUserId};
use oauth2::{
    basic::{BasicClient, BasicRequestTokenError},
    reqwest::{async_http_client, AsyncHttpClientError},
    AuthorizationCode, CsrfToken, TokenResponse,
};
use reqwest::{
    header::{AUTHORIZATION, USER_AGENT},
    Url,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    domain::{models::ProfileId, Profile},
    repositories::{NewProfile, ProfileRepository, ProfileRepositoryImpl, RepositoryError},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub code: String,
    pub old_state: CsrfToken,
    pub new_state: CsrfToken,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(rename = "name", default)]
    full_name: String,
    email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Sqlx(#[from] RepositoryError),

    #[error(transparent)]
    Reqwest(reqwest::Error),

    #[error(transparent)]
    OAuth2(BasicRequestTokenError<AsyncHttpClientError>),
}

#[derive(Debug, Clone)]
pub struct AuthBackend {
    db: PgPool,
    client: BasicClient,
    userinfo_url: Url,
}

impl AuthBackend {
    pub fn new(db: PgPool, client: BasicClient, userinfo_url: Url) -> Self {
        Self {
            db,
            client,
            userinfo_url,
        }
    }

    pub fn authorize_url(&self) -> (Url, CsrfToken) {
        self.client
            .authorize_url(CsrfToken::new_random)
            .add_scope(oauth2::Scope::new("openid".to_string()))
            .add_scope(oauth2::Scope::new("email".to_string()))
            .add_scope(oauth2::Scope::new("profile".to_string()))
            .url()
    }
}

#[async_trait]
impl AuthnBackend for AuthBackend {
    type User = Profile;
    type Credentials = Credentials;
    type Error = BackendError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        // Ensure the CSRF state has not been tampered with.
        if creds.old_state.secret() != creds.new_state.secret() {
            return Ok(None);
        };

        let token_res = self
            .client
            .exchange_code(AuthorizationCode::new(creds.code))
            .request_async(async_http_client)
            .await
            .map_err(Self::Error::OAuth2)?;

        let user_info = reqwest::Client::new()
            .get(self.userinfo_url.clone())
            .header(USER_AGENT.as_str(), "indicators-login")
            .header(
                AUTHORIZATION.as_str(),
                format!("Bearer {}", token_res.access_token().secret()),
            )
            .send()
            .await
            .map_err(Self::Error::Reqwest)?
            .error_for_status()
            .map_err(Self::Error::Reqwest)?
            .json::<UserInfo>()
            .await
            .map_err(Self::Error::Reqwest)?;

        // First-time users land as pending until an admin approves them.
        let profile_repo = ProfileRepositoryImpl::new(self.db.clone());
        let new_profile = NewProfile::new(
            user_info.email,
            user_info.full_name,
            token_res.access_token().secret().to_string(),
        );

        let profile = profile_repo.upsert_profile(&new_profile).await?;
        tracing::info!(profile_id = %profile.id, role = %profile.role, "profile signed in");

        Ok(Some(profile))
    }

    async fn get_user(
        &self,
        user_id: &SessionUserId<Self>,
    ) -> Result<Option<Self::User>, Self::Error> {
        let Ok(id) = i32::try_from(*user_id) else {
            return Ok(None);
        };

        let profile_repo = ProfileRepositoryImpl::new(self.db.clone());
        Ok(profile_repo.get_profile(ProfileId::new(id)).await?)
    }
}

pub type AuthSession = axum_login::AuthSession<AuthBackend>;
