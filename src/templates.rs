//! HTML templates and the data they are rendered with
//!
//! Templates are embedded at compile time and rendered with minijinja, which
//! escapes everything interpolated into `.html` templates. A page template
//! `name.html` may have a `name.htmx.html` sibling holding only the content
//! swapped in by htmx requests.

use crate::{auth::Viewer, db::models::Entry, wiki::PagePath};
use minijinja::{context, Environment, Error};
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("login_form.html", include_str!("../templates/login_form.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("login.htmx.html", include_str!("../templates/login.htmx.html")),
    ("register_form.html", include_str!("../templates/register_form.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("register.htmx.html", include_str!("../templates/register.htmx.html")),
    ("page.html", include_str!("../templates/page.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("home.htmx.html", include_str!("../templates/home.htmx.html")),
    ("entry.html", include_str!("../templates/entry.html")),
    ("edit_text.html", include_str!("../templates/edit_text.html")),
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Renders a full page, or its htmx variant when there is one
    pub fn page<S: Serialize>(&self, name: &str, htmx: bool, data: S) -> Result<String, Error> {
        let variant = format!("{}.htmx.html", name);
        let template = match self.env.get_template(&variant) {
            Ok(t) if htmx => t,
            _ => self.env.get_template(&format!("{}.html", name))?,
        };
        tracing::debug!("rendering {}", template.name());
        template.render(data)
    }

    /// A single text entry, as listed on a page
    pub fn entry(&self, text: &EntryData) -> Result<String, Error> {
        self.env
            .get_template("entry.html")?
            .render(context! { text => text })
    }

    pub fn edit_form(&self, data: &EditData) -> Result<String, Error> {
        self.env.get_template("edit_text.html")?.render(data)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct FormData {
    pub error: Option<String>,
    pub flash: Option<String>,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct Crumb {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct EntryData {
    pub page_id: i64,
    pub text_id: i64,
    pub text: String,
    /// Target of a link entry
    pub href: Option<String>,
    pub user: String,
    pub created_at: String,
    pub edited: bool,
    pub source_title: Option<String>,
    pub source_href: Option<String>,
    /// Whether the viewer wrote the entry
    pub own: bool,
}

impl EntryData {
    /// `base` is the path the entry is displayed under
    pub fn new(entry: &Entry, base: &PagePath, viewer: &Viewer) -> Self {
        let from_elsewhere = entry.source.map_or(false, |s| s != entry.page_id);
        Self {
            page_id: entry.page_id,
            text_id: entry.id,
            text: entry.text.clone(),
            href: entry
                .link_id
                .map(|id| format!("/page/{}", base.child(id))),
            user: entry.username.clone(),
            created_at: entry.created_at.format(DATE_FORMAT).to_string(),
            edited: entry.is_edited,
            source_title: entry.source_title.clone().filter(|_| from_elsewhere),
            source_href: entry
                .path
                .as_ref()
                .filter(|_| from_elsewhere)
                .map(|p| format!("/page/{}", p)),
            own: entry.user_id == viewer.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageData {
    /// Owner of the profile on profile pages, the viewer elsewhere
    pub username: String,
    pub viewer: String,
    pub logged_in: bool,
    pub page_id: i64,
    /// Where the add form posts to
    pub path: String,
    pub crumbs: Vec<Crumb>,
    pub texts: Vec<EntryData>,
    pub editable: bool,
    pub profile: bool,
    /// Longest text the add form accepts
    pub max_length: usize,
}

#[derive(Debug, Serialize)]
pub struct EditData {
    pub page_id: i64,
    pub text_id: i64,
    pub text: String,
    pub max_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(source: Option<i64>) -> Entry {
        Entry {
            id: 5,
            page_id: 3,
            user_id: 1,
            username: "alice".to_owned(),
            text: "cat".to_owned(),
            link_id: Some(4),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            is_edited: false,
            path: Some("0".to_owned()),
            source,
            source_title: Some("Home".to_owned()),
        }
    }

    fn viewer(id: i64) -> Viewer {
        Viewer {
            id,
            username: "v".to_owned(),
        }
    }

    #[test]
    fn entry_links_and_sources() {
        let base: PagePath = "0/3".parse().unwrap();
        let data = EntryData::new(&entry(Some(0)), &base, &viewer(1));
        assert_eq!(data.href.as_deref(), Some("/page/0/3/4"));
        assert_eq!(data.created_at, "2024-05-01 09:30");
        assert_eq!(data.source_title.as_deref(), Some("Home"));
        assert_eq!(data.source_href.as_deref(), Some("/page/0"));
        assert!(data.own);

        let data = EntryData::new(&entry(Some(3)), &base, &viewer(2));
        assert_eq!(data.source_title, None);
        assert_eq!(data.source_href, None);
        assert!(!data.own);
    }

    #[test]
    fn every_template_renders() {
        let templates = Templates::new().unwrap();
        let form = FormData {
            error: Some("<b>bad</b>".to_owned()),
            ..Default::default()
        };
        let html = templates.page("login", false, &form).unwrap();
        assert!(html.contains("&lt;b&gt;bad"));
        assert!(!html.contains("<b>bad"));
        assert!(html.contains("<html"));

        let fragment = templates.page("login", true, &form).unwrap();
        assert!(!fragment.contains("<html"));

        let index = templates.page("index", true, &form).unwrap();
        assert!(index.contains("<html"));

        let base = PagePath::root(3);
        let html = templates
            .entry(&EntryData::new(&entry(None), &base, &viewer(1)))
            .unwrap();
        assert!(html.contains(r#"href="/page/3/4""#));
        assert!(html.contains("/editText/3/5"));

        let html = templates
            .edit_form(&EditData {
                page_id: 3,
                text_id: 5,
                text: "a \"quoted\" cat".to_owned(),
                max_length: 80,
            })
            .unwrap();
        assert!(html.contains("/editText/3/5/cancel"));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(html.contains(r#"maxlength="80""#));
    }
}
