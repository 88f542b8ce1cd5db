use super::path::PagePath;
use crate::{
    db::{
        models::{Entry, Page},
        Db,
    },
    error::{Error, Result},
};

/// A page resolved along its breadcrumb
#[derive(Debug)]
pub struct PageView {
    /// One page per path segment, in order
    pub crumbs: Vec<Page>,
    pub entries: Vec<Entry>,
}

/// Looks up the title of every page along `path`
#[tracing::instrument(level = "debug", skip(db))]
pub async fn crumbs(db: &Db, path: &PagePath) -> Result<Vec<Page>> {
    let mut crumbs = Vec::with_capacity(path.ids().len());
    for &id in path.ids() {
        let title = db
            .page_title(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Page {} does not exist", id)))?;
        crumbs.push(Page { id, title });
    }
    Ok(crumbs)
}

/// Resolves every page of `path` and loads the entries of the last one
#[tracing::instrument(level = "debug", skip(db))]
pub async fn load(db: &Db, path: &PagePath, author: Option<i64>) -> Result<PageView> {
    let crumbs = crumbs(db, path).await?;

    tracing::debug!("loading text for {}", crumbs[crumbs.len() - 1].title);
    let entries = db.entries(path.current(), author).await?;
    Ok(PageView { crumbs, entries })
}
