//! Turning submitted text into notes and links

use super::{page, path::PagePath};
use crate::{
    db::{
        models::{Entry, NewEntry},
        Db,
    },
    error::{Error, Result},
};

/// What a piece of submitted text becomes once stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A single lower-cased word naming the linked page
    Link(String),
    Note(String),
}

impl Submission {
    /// Classifies trimmed text, `on_profile` disables links
    pub fn classify(raw: &str, max_len: usize, on_profile: bool) -> Result<Self> {
        let text = raw.trim();
        if text.chars().count() > max_len {
            return Err(Error::validation(format!(
                "Text exceeds maximum length of {} characters",
                max_len
            )));
        }
        if text.is_empty() {
            return Err(Error::validation("Text cannot be empty"));
        }

        if !on_profile && text.split_whitespace().count() == 1 {
            Ok(Self::Link(text.to_lowercase()))
        } else {
            Ok(Self::Note(text.to_owned()))
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Link(t) | Self::Note(t) => t,
        }
    }

    /// Page id a link points to, creating the page on first use
    async fn link_id(&self, db: &Db) -> Result<Option<i64>> {
        match self {
            Self::Link(title) => Ok(Some(db.resolve_page(title).await?)),
            Self::Note(_) => Ok(None),
        }
    }
}

/// Outcome of editing an entry
#[derive(Debug)]
pub enum Edited {
    Updated(Entry),
    Deleted,
}

/// Stores `raw` on the current page of `path` on behalf of `user_id`
#[tracing::instrument(level = "debug", skip(db, raw))]
pub async fn add(
    db: &Db,
    user_id: i64,
    path: &PagePath,
    raw: &str,
    profile: i64,
    max_len: usize,
) -> Result<Entry> {
    let page_id = path.current();
    let submission = Submission::classify(raw, max_len, page_id == profile)?;

    // the source column references the parent page too
    page::crumbs(db, path).await?;

    let link_id = submission.link_id(db).await?;
    let source_path = path.source_path();
    tracing::info!(
        "adding text to page {} with source path {} and source {}",
        page_id,
        source_path,
        path.source()
    );

    let id = db
        .insert_entry(&NewEntry {
            page_id,
            user_id,
            text: submission.text(),
            link_id,
            path: &source_path,
            source: path.source(),
        })
        .await?;

    db.entry(page_id, id)
        .await?
        .ok_or_else(|| Error::not_found("Text vanished after insertion"))
}

/// Fetches an entry for display
#[tracing::instrument(level = "debug", skip(db))]
pub async fn show(db: &Db, page_id: i64, id: i64) -> Result<Entry> {
    db.entry(page_id, id)
        .await?
        .ok_or_else(|| Error::not_found("Text not found"))
}

/// Fetches an entry its author is about to edit
#[tracing::instrument(level = "debug", skip(db))]
pub async fn load_own(db: &Db, user_id: i64, page_id: i64, id: i64) -> Result<Entry> {
    let entry = show(db, page_id, id).await?;
    if entry.user_id != user_id {
        return Err(Error::forbidden("You are not allowed to edit this text."));
    }
    Ok(entry)
}

/// Replaces the text of an entry, empty text deletes it
#[tracing::instrument(level = "debug", skip(db, raw))]
pub async fn update(
    db: &Db,
    user_id: i64,
    page_id: i64,
    id: i64,
    raw: &str,
    profile: i64,
    max_len: usize,
) -> Result<Edited> {
    load_own(db, user_id, page_id, id).await?;

    let submission = match Submission::classify(raw, max_len, page_id == profile) {
        Ok(s) => s,
        Err(Error::Validation(_)) if raw.trim().is_empty() => {
            db.delete_entry(page_id, id, user_id).await?;
            return Ok(Edited::Deleted);
        }
        Err(e) => return Err(e),
    };

    let link_id = submission.link_id(db).await?;
    if !db
        .update_entry(page_id, id, user_id, submission.text(), link_id)
        .await?
    {
        return Err(Error::not_found("Text not found"));
    }
    Ok(Edited::Updated(show(db, page_id, id).await?))
}

/// Removes an entry, only its author may do so
#[tracing::instrument(level = "debug", skip(db))]
pub async fn delete(db: &Db, user_id: i64, page_id: i64, id: i64) -> Result<()> {
    load_own(db, user_id, page_id, id).await?;
    if !db.delete_entry(page_id, id, user_id).await? {
        return Err(Error::not_found("Text not found"));
    }
    Ok(())
}
