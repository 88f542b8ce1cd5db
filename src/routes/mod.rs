mod account;
mod pages;

use crate::{context::Context, reject};
use warp::{Filter, Rejection, Reply};

pub fn handler(
    ctx: &'static Context,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone + Send + Sync + 'static {
    let styles = warp::path("styles").and(warp::fs::dir(ctx.config.static_dir.clone()));

    account::routes(ctx)
        .or(pages::routes(ctx))
        .unify()
        .or(styles)
        .recover(reject::handle_rejections)
        .with(warp::trace::request())
}
