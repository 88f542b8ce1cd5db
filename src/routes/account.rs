use crate::{
    auth::{self, Registration},
    context::Context,
    db::models::NewUser,
    reject::TryExt,
    session::FLASH_COOKIE,
    templates::FormData,
    util,
};
use serde::Deserialize;
use warp::{
    http::header,
    reply::{Reply, Response},
    Filter, Rejection,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    email: String,
    password: String,
}

pub fn routes(
    ctx: &'static Context,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone + Send + Sync + 'static {
    let index = warp::path::end()
        .and(warp::get())
        .and(auth::guest(ctx))
        .and(util::htmx())
        .and_then(move |htmx| index(htmx, ctx));

    let register_form = warp::path!("register")
        .and(warp::get())
        .and(auth::guest(ctx))
        .and(util::htmx())
        .and_then(move |htmx| form_page("register", FormData::default(), htmx, ctx));
    let register = warp::path!("register")
        .and(warp::post())
        .and(auth::guest(ctx))
        .and(util::htmx())
        .and(util::form::<Registration>())
        .and_then(move |htmx, form| register(form, htmx, ctx));

    let login_form = warp::path!("login")
        .and(warp::get())
        .and(auth::guest(ctx))
        .and(util::htmx())
        .and(warp::cookie::optional::<String>(FLASH_COOKIE))
        .and_then(move |htmx, flash| login_form(flash, htmx, ctx));
    let login = warp::path!("login")
        .and(warp::post())
        .and(auth::guest(ctx))
        .and(util::htmx())
        .and(util::form::<LoginForm>())
        .and_then(move |htmx, form| login(form, htmx, ctx));

    let logout = warp::path!("logout")
        .and(warp::get().or(warp::post()).unify())
        .map(move || util::redirect_with_cookie("/", ctx.sessions.logout()));

    index
        .or(register_form)
        .unify()
        .or(register)
        .unify()
        .or(login_form)
        .unify()
        .or(login)
        .unify()
        .or(logout)
        .unify()
}

#[tracing::instrument(level = "debug", skip(ctx))]
async fn index(htmx: bool, ctx: &Context) -> Result<Response, Rejection> {
    form_page("index", FormData::default(), htmx, ctx).await
}

async fn form_page(
    name: &str,
    data: FormData,
    htmx: bool,
    ctx: &Context,
) -> Result<Response, Rejection> {
    let html = ctx.templates.page(name, htmx, &data).or_500()?;
    Ok(warp::reply::html(html).into_response())
}

#[tracing::instrument(level = "debug", skip(form, ctx), fields(username = %form.username))]
async fn register(form: Registration, htmx: bool, ctx: &Context) -> Result<Response, Rejection> {
    let mut data = FormData {
        username: form.username.clone(),
        email: form.email.clone(),
        ..Default::default()
    };

    if let Err(msg) = form.validate() {
        data.error = Some(msg.to_owned());
        return form_page("register", data, htmx, ctx).await;
    }

    let password_hash = auth::hash(form.password.as_bytes(), &ctx.config.password).or_500()?;
    let user = NewUser {
        username: &form.username,
        email: &form.email,
        password_hash: &password_hash,
    };
    match ctx.db.insert_user(&user).await {
        Ok(id) => tracing::info!("registered user {} as {}", form.username, id),
        Err(e) if e.is_unique_violation() => {
            tracing::info!("{}", e);
            data.error = Some("Email or username already exists.".to_owned());
            return form_page("register", data, htmx, ctx).await;
        }
        Err(e) => {
            tracing::error!("{}", e);
            data.error = Some("Error registering user.".to_owned());
            return form_page("register", data, htmx, ctx).await;
        }
    }

    let flash = ctx
        .sessions
        .set_flash("Registration successful. You can now log in.")
        .or_500()?;
    Ok(util::redirect_with_cookie("/login", flash))
}

#[tracing::instrument(level = "debug", skip(flash, ctx))]
async fn login_form(flash: Option<String>, htmx: bool, ctx: &Context) -> Result<Response, Rejection> {
    let data = FormData {
        flash: flash.as_deref().and_then(|f| ctx.sessions.flash(f)),
        ..Default::default()
    };
    let reply = form_page("login", data, htmx, ctx).await?;
    match flash {
        Some(_) => Ok(
            warp::reply::with_header(reply, header::SET_COOKIE, ctx.sessions.clear_flash())
                .into_response(),
        ),
        None => Ok(reply),
    }
}

#[tracing::instrument(level = "debug", skip(form, ctx), fields(email = %form.email))]
async fn login(form: LoginForm, htmx: bool, ctx: &Context) -> Result<Response, Rejection> {
    let user = ctx.db.user_by_email(&form.email).await?;
    let verified = match &user {
        Some(u) => auth::verify(&u.password, form.password.as_bytes(), &ctx.config.password)
            .or_500()?,
        None => false,
    };

    let user = match user {
        Some(u) if verified => u,
        _ => {
            let data = FormData {
                error: Some("Invalid email or password".to_owned()),
                email: form.email,
                ..Default::default()
            };
            return form_page("login", data, htmx, ctx).await;
        }
    };

    let cookie = ctx.sessions.login(&user.username).or_500()?;
    tracing::info!("{} logged in", user.username);
    Ok(util::redirect_with_cookie("/home", cookie))
}
