use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::SameSite;
use axum_login::{
    tower_sessions::{CachingSessionStore, ExpiredDeletion, Expiry, SessionManagerLayer},
    AuthManagerLayer, AuthManagerLayerBuilder,
};
use oauth2::{basic::BasicClient, AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use sqlx::PgPool;
use time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tower_sessions_moka_store::MokaStore;
use tower_sessions_sqlx_store::PostgresStore;
use url::Url;

type SessionStore = CachingSessionStore<MokaStore, PostgresStore>;

use crate::{
    app_state::AppState,
    auth::{self, AuthBackend},
    config::{Environment, Settings},
    routes,
};

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("invalid auth configuration: {0}")]
    AuthConfig(#[from] oauth2::url::ParseError),
    #[error("invalid user-info url: {0}")]
    UserInfoUrl(url::ParseError),
    #[error("invalid application url for CORS: {0}")]
    AppOrigin(#[from] axum::http::header::InvalidHeaderValue),
    #[error("session store migration failed: {0}")]
    SessionStore(#[from] sqlx::Error),
}

pub async fn create(
    connection_pool: PgPool,
    app_state: AppState,
    config: Settings,
) -> Result<Router<()>, RouterError> {
    let tracking_routes = Router::new()
        .nest("/contributions", routes::contributions::router())
        .nest("/own-indicators", routes::own_indicators::router())
        .nest("/evidence", routes::evidence::router())
        .nest("/dashboard", routes::dashboard::router())
        .nest("/macros", routes::macros::router())
        .nest("/admin", routes::admin::router());

    // Role checks happen in the extractors; the session layer must wrap every route.
    let auth_layer = new_auth_layer(connection_pool, &config).await?;
    let app = Router::new()
        .route("/", get(|| async { "indicators-api" }))
        .merge(tracking_routes)
        .merge(auth::router())
        .layer(auth_layer);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(HeaderValue::from_str(
            config.application.app_url.trim_end_matches('/'),
        )?);

    Ok(app
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default())))
}

async fn new_auth_layer(
    connection_pool: PgPool,
    config: &Settings,
) -> Result<AuthManagerLayer<AuthBackend, SessionStore>, RouterError> {
    let auth = &config.auth;
    let client = BasicClient::new(
        ClientId::new(auth.client_id.clone()),
        Some(ClientSecret::new(auth.client_secret.clone())),
        AuthUrl::new(auth.auth_url.clone())?,
        Some(TokenUrl::new(auth.token_url.clone())?),
    )
    .set_redirect_uri(RedirectUrl::new(auth.redirect_url.clone())?);
    let userinfo_url = Url::parse(&auth.userinfo_url).map_err(RouterError::UserInfoUrl)?;

    // DB-backed sessions survive restarts
    let db_store = PostgresStore::new(connection_pool.clone());
    db_store.migrate().await?;

    let deletion_task = tokio::task::spawn(
        db_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
    );
    drop(deletion_task);

    // In-memory cache in front of the DB for hot sessions
    let cache_store = MokaStore::new(Some(2_000));
    let session_store = CachingSessionStore::new(cache_store, db_store);

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(Environment::current() == Environment::Production)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)));

    let backend = AuthBackend::new(connection_pool, client, userinfo_url);
    Ok(AuthManagerLayerBuilder::new(backend, session_layer).build())
}
