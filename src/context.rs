use crate::{
    config::Config,
    db::{self, models::SeedPages, Db},
    session::SessionStore,
    templates::Templates,
};
use anyhow::Error;

/// Everything request handlers share, built once at startup
pub struct Context {
    pub config: &'static Config,
    pub db: Db,
    pub templates: Templates,
    pub sessions: SessionStore,
    pub pages: SeedPages,
}

impl Context {
    #[tracing::instrument(level = "debug", skip(config))]
    pub async fn build(config: &'static Config) -> Result<&'static Self, Error> {
        let pool = db::pool::build(config).await?;
        let db = Db::new(pool, config.query_timeout());
        db.init().await?;

        let pages = db.seed_pages().await?;
        tracing::info!(
            "seed pages ready: home={}, profile={}",
            pages.home,
            pages.profile
        );

        let ctx = Self {
            config,
            db,
            templates: Templates::new()?,
            sessions: SessionStore::new(&config.session)?,
            pages,
        };
        Ok(&*Box::leak(Box::new(ctx)))
    }
}
