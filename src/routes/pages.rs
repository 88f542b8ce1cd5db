use crate::{
    auth::{self, Viewer},
    context::Context,
    error::Error,
    reject::TryExt,
    templates::{Crumb, EditData, EntryData, PageData},
    util,
    wiki::{
        self,
        entry::Edited,
        page::PageView,
        PagePath,
    },
};
use serde::Deserialize;
use warp::{
    path::Tail,
    reply::{Reply, Response},
    Filter, Rejection,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextForm {
    text: String,
}

pub fn routes(
    ctx: &'static Context,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone + Send + Sync + 'static {
    let home = warp::path!("home")
        .and(warp::get())
        .and(auth::required(ctx))
        .and(util::htmx())
        .and_then(move |viewer, htmx| page(None, viewer, htmx, ctx));
    let page = warp::path("page")
        .and(warp::path::tail())
        .and(warp::get())
        .and(auth::required(ctx))
        .and(util::htmx())
        .and_then(move |tail: Tail, viewer, htmx| page(tail.as_str().parse().ok(), viewer, htmx, ctx));

    let profile = warp::path("profile")
        .and(warp::path::tail())
        .and(warp::get())
        .and(auth::required(ctx))
        .and(util::htmx())
        .and_then(move |tail: Tail, viewer, htmx| {
            profile(tail.as_str().parse().ok(), viewer, htmx, ctx)
        });

    let add_text = warp::path("addText")
        .and(warp::path::tail())
        .and(warp::post())
        .and(auth::required(ctx))
        .and(util::form::<TextForm>())
        .and_then(move |tail: Tail, viewer, form| add_text(tail, viewer, form, ctx));

    let edit_text = warp::path!("editText" / i64 / i64)
        .and(warp::get())
        .and(auth::required(ctx))
        .and_then(move |page_id, text_id, viewer| edit_text(page_id, text_id, viewer, ctx));
    let cancel_edit = warp::path!("editText" / i64 / i64 / "cancel")
        .and(warp::get())
        .and(auth::required(ctx))
        .and_then(move |page_id, text_id, viewer| cancel_edit(page_id, text_id, viewer, ctx));
    let update_text = warp::path!("editText" / i64 / i64)
        .and(warp::put())
        .and(auth::required(ctx))
        .and(util::form::<TextForm>())
        .and_then(move |page_id, text_id, viewer, form| {
            update_text(page_id, text_id, viewer, form, ctx)
        });
    let delete_text = warp::path!("editText" / i64 / i64)
        .and(warp::delete())
        .and(auth::required(ctx))
        .and_then(move |page_id, text_id, viewer| delete_text(page_id, text_id, viewer, ctx));

    home.or(page)
        .unify()
        .or(profile)
        .unify()
        .or(add_text)
        .unify()
        .or(edit_text)
        .unify()
        .or(cancel_edit)
        .unify()
        .or(update_text)
        .unify()
        .or(delete_text)
        .unify()
}

fn html(html: String) -> Response {
    warp::reply::html(html).into_response()
}

/// Builds the template data of a resolved page
fn page_data(
    view: PageView,
    path: &PagePath,
    viewer: &Viewer,
    username: String,
    editable: bool,
    profile: bool,
    max_length: usize,
) -> PageData {
    let crumbs = view
        .crumbs
        .into_iter()
        .enumerate()
        .map(|(i, page)| Crumb {
            title: page.title,
            href: if profile {
                "/profile".to_owned()
            } else {
                format!("/page/{}", path.prefix(i + 1))
            },
        })
        .collect();

    PageData {
        username,
        viewer: viewer.username.clone(),
        logged_in: true,
        page_id: path.current(),
        path: path.to_string(),
        crumbs,
        texts: view
            .entries
            .iter()
            .map(|e| EntryData::new(e, path, viewer))
            .collect(),
        editable,
        profile,
        max_length,
    }
}

/// Any valid path, `None` meaning Home
#[tracing::instrument(level = "debug", skip(ctx))]
async fn page(
    path: Option<PagePath>,
    viewer: Viewer,
    htmx: bool,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let path = path.unwrap_or_else(|| PagePath::root(ctx.pages.home));
    if path.current() == ctx.pages.profile {
        return Ok(util::redirect("/profile"));
    }

    let view = match wiki::page::load(&ctx.db, &path, None).await {
        Ok(v) => v,
        Err(Error::NotFound(msg)) => {
            tracing::info!("{}", msg);
            return Ok(util::redirect("/home"));
        }
        Err(e) => return Err(e.into()),
    };

    let data = page_data(
        view,
        &path,
        &viewer,
        viewer.username.clone(),
        true,
        false,
        ctx.config.max_text_length,
    );
    Ok(html(ctx.templates.page("home", htmx, &data).or_500()?))
}

/// The profile of the user whose id ends `path`, the viewer's own otherwise
#[tracing::instrument(level = "debug", skip(ctx))]
async fn profile(
    path: Option<PagePath>,
    viewer: Viewer,
    htmx: bool,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let (owner_id, owner) = match path {
        None => (viewer.id, viewer.username.clone()),
        Some(path) => match ctx.db.user_by_id(path.current()).await? {
            Some(user) => (user.id, user.username),
            None => return Ok(util::redirect("/profile")),
        },
    };

    let path = PagePath::root(ctx.pages.profile);
    let view = wiki::page::load(&ctx.db, &path, Some(owner_id)).await?;
    let data = page_data(
        view,
        &path,
        &viewer,
        owner,
        viewer.id == owner_id,
        true,
        ctx.config.max_text_length,
    );
    Ok(html(ctx.templates.page("home", htmx, &data).or_500()?))
}

#[tracing::instrument(level = "debug", skip(ctx))]
async fn add_text(
    tail: Tail,
    viewer: Viewer,
    form: TextForm,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let path: PagePath = tail.as_str().parse().or_bad_request("Invalid page path")?;
    let entry = wiki::entry::add(
        &ctx.db,
        viewer.id,
        &path,
        &form.text,
        ctx.pages.profile,
        ctx.config.max_text_length,
    )
    .await?;

    let data = EntryData::new(&entry, &path, &viewer);
    Ok(html(ctx.templates.entry(&data).or_500()?))
}

#[tracing::instrument(level = "debug", skip(ctx))]
async fn edit_text(
    page_id: i64,
    text_id: i64,
    viewer: Viewer,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let entry = wiki::entry::load_own(&ctx.db, viewer.id, page_id, text_id).await?;
    let data = EditData {
        page_id,
        text_id,
        text: entry.text,
        max_length: ctx.config.max_text_length,
    };
    Ok(html(ctx.templates.edit_form(&data).or_500()?))
}

#[tracing::instrument(level = "debug", skip(ctx))]
async fn cancel_edit(
    page_id: i64,
    text_id: i64,
    viewer: Viewer,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let entry = wiki::entry::show(&ctx.db, page_id, text_id).await?;
    let data = EntryData::new(&entry, &PagePath::root(page_id), &viewer);
    Ok(html(ctx.templates.entry(&data).or_500()?))
}

#[tracing::instrument(level = "debug", skip(ctx))]
async fn update_text(
    page_id: i64,
    text_id: i64,
    viewer: Viewer,
    form: TextForm,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let edited = wiki::entry::update(
        &ctx.db,
        viewer.id,
        page_id,
        text_id,
        &form.text,
        ctx.pages.profile,
        ctx.config.max_text_length,
    )
    .await?;

    match edited {
        Edited::Deleted => Ok(util::empty()),
        Edited::Updated(entry) => {
            let data = EntryData::new(&entry, &PagePath::root(page_id), &viewer);
            Ok(html(ctx.templates.entry(&data).or_500()?))
        }
    }
}

#[tracing::instrument(level = "debug", skip(ctx))]
async fn delete_text(
    page_id: i64,
    text_id: i64,
    viewer: Viewer,
    ctx: &Context,
) -> Result<Response, Rejection> {
    wiki::entry::delete(&ctx.db, viewer.id, page_id, text_id).await?;
    Ok(util::empty())
}
