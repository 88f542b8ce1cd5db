use crate::config::{Config, PoolConfig};
use anyhow::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

#[tracing::instrument(level = "debug", skip(config))]
pub async fn build(config: &Config) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = apply_config(SqlitePoolOptions::new(), &config.pool)
        .connect_with(options)
        .await?;
    tracing::debug!("connected to {}", config.database_url);
    Ok(pool)
}

fn apply_config(mut builder: SqlitePoolOptions, config: &PoolConfig) -> SqlitePoolOptions {
    if let Some(mc) = config.max_connections {
        builder = builder.max_connections(mc);
    }
    if let Some(mc) = config.min_connections {
        builder = builder.min_connections(mc);
    }
    if let Some(ct) = config.connect_timeout {
        builder = builder.acquire_timeout(Duration::from_millis(ct));
    }
    if let Some(it) = config.idle_timeout {
        builder = builder.idle_timeout(Duration::from_millis(it));
    }
    if let Some(ml) = config.max_lifetime {
        builder = builder.max_lifetime(Duration::from_millis(ml));
    }
    builder
}
