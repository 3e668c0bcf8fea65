use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::read_config;

mod adapters;
mod app_state;
mod auth;
mod config;
mod domain;
mod factory;
mod repositories;
mod router;
mod routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_filename(".env.local").ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "indicators_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = read_config()?;

    let connection_pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy_with(config.database.with_db());

    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    let app_state = factory::build_app_state(connection_pool.clone(), &config)?;

    let addr: SocketAddr = format!("{}:{}", config.application.host, config.application.port)
        .parse()?;
    let app = router::create(connection_pool, app_state, config).await?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
