use serde::de::DeserializeOwned;
use warp::{
    http::{header, StatusCode},
    reply::{Reply, Response},
    Filter, Rejection,
};

/// Upper bound on urlencoded form bodies
const FORM_LIMIT: u64 = 16 * 1024;

pub trait DefaultExt {
    fn is_default(&self) -> bool;
}
impl<T: Default + PartialEq> DefaultExt for T {
    fn is_default(&self) -> bool {
        self.eq(&Default::default())
    }
}

/// Extracts whether the request was issued by htmx
pub fn htmx() -> impl Filter<Extract = (bool,), Error = Rejection> + Copy + Send + Sync + 'static {
    warp::header::optional::<String>("hx-request")
        .map(|h: Option<String>| h.as_deref() == Some("true"))
}

/// Deserializes a size-limited urlencoded form body
pub fn form<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Copy + Send + Sync + 'static
where
    T: DeserializeOwned + Send + 'static,
{
    warp::body::content_length_limit(FORM_LIMIT).and(warp::body::form())
}

/// 303 See Other to `location`
pub fn redirect(location: &str) -> Response {
    warp::reply::with_header(StatusCode::SEE_OTHER, header::LOCATION, location).into_response()
}

/// Same as [`redirect`] while setting a cookie
pub fn redirect_with_cookie(location: &str, cookie: String) -> Response {
    warp::reply::with_header(redirect(location), header::SET_COOKIE, cookie).into_response()
}

/// An empty 200, which htmx uses to swap an element away
pub fn empty() -> Response {
    StatusCode::OK.into_response()
}
