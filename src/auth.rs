use crate::{
    config::PasswordConfig,
    context::Context,
    reject::{self, TryExt},
    session::SESSION_COOKIE,
};
use anyhow::Result;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tokio::task;
use warp::{Filter, Rejection};

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s<>]+@[^@\s<>]+$").unwrap());

const MIN_PASSWORD_LENGTH: usize = 6;

/// The logged-in user a request is made on behalf of
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: i64,
    pub username: String,
}

/// Resolves the session cookie to a user, if any
pub fn viewer(
    ctx: &'static Context,
) -> impl Filter<Extract = (Option<Viewer>,), Error = Rejection> + Copy + Send + Sync + 'static {
    warp::cookie::optional::<String>(SESSION_COOKIE)
        .and_then(move |cookie: Option<String>| async move { lookup(cookie, ctx).await })
}

/// Requires a session, redirecting guests to the landing page
pub fn required(
    ctx: &'static Context,
) -> impl Filter<Extract = (Viewer,), Error = Rejection> + Copy + Send + Sync + 'static {
    viewer(ctx).and_then(|viewer: Option<Viewer>| async move {
        viewer.ok_or_else(|| reject::redirect("/"))
    })
}

/// Only lets guests through, logged-in users are sent home
pub fn guest(
    ctx: &'static Context,
) -> impl Filter<Extract = (), Error = Rejection> + Copy + Send + Sync + 'static {
    viewer(ctx)
        .and_then(|viewer: Option<Viewer>| async move {
            match viewer {
                Some(_) => Err(reject::redirect("/home")),
                None => Ok(()),
            }
        })
        .untuple_one()
}

#[tracing::instrument(level = "debug", skip(cookie, ctx))]
async fn lookup(cookie: Option<String>, ctx: &Context) -> Result<Option<Viewer>, Rejection> {
    let username = match cookie.and_then(|c| ctx.sessions.user(&c)) {
        Some(u) => u,
        None => return Ok(None),
    };
    let user = ctx.db.user_by_username(&username).await.or_500()?;
    Ok(user.map(|u| Viewer {
        id: u.id,
        username: u.username,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Checks the form, returning the message to show on failure
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err("All fields are required.");
        }
        if !USERNAME.is_match(&self.username) {
            return Err("Username can only contain letters and numbers.");
        }
        if !EMAIL.is_match(&self.email) {
            return Err("Invalid email format.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err("Password must be at least 6 characters.");
        }
        Ok(())
    }
}

#[tracing::instrument(level = "debug", skip(password))]
pub fn hash(password: &[u8], config: &PasswordConfig) -> Result<String> {
    let mut cfg = argon2::Config::default();
    if let Some(hl) = config.hash_length {
        cfg.hash_length = hl;
    }
    if let Some(l) = config.lanes {
        cfg.lanes = l;
    }
    if let Some(mc) = config.memory_cost {
        cfg.mem_cost = mc;
    }
    if let Some(tc) = config.time_cost {
        cfg.time_cost = tc;
    }
    if let Some(s) = config.secret.as_ref().map(|s| s.as_bytes()) {
        cfg.secret = s;
    }

    let hashed = task::block_in_place(move || {
        let mut salt = vec![0; config.salt_length.unwrap_or(16)];
        rand::thread_rng().fill(&mut salt[..]);

        argon2::hash_encoded(password, &salt[..], &cfg)
    })?;
    Ok(hashed)
}

#[tracing::instrument(level = "debug", skip(encoded, password))]
pub fn verify(encoded: &str, password: &[u8], config: &PasswordConfig) -> Result<bool> {
    let res = match &config.secret {
        Some(s) => task::block_in_place(move || {
            argon2::verify_encoded_ext(encoded, password, s.as_bytes(), &[])
        })?,
        None => task::block_in_place(move || argon2::verify_encoded(encoded, password))?,
    };
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str) -> Registration {
        Registration {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    #[test]
    fn registration_rules() {
        assert_eq!(form("alice", "alice@x.com", "secret1").validate(), Ok(()));
        assert_eq!(
            form("", "alice@x.com", "secret1").validate(),
            Err("All fields are required.")
        );
        assert_eq!(
            form("al ice", "alice@x.com", "secret1").validate(),
            Err("Username can only contain letters and numbers.")
        );
        assert_eq!(
            form("alice", "alice.x.com", "secret1").validate(),
            Err("Invalid email format.")
        );
        assert_eq!(
            form("alice", "alice@x.com", "short").validate(),
            Err("Password must be at least 6 characters.")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn hashes_verify() {
        let config = PasswordConfig {
            memory_cost: Some(1024),
            ..Default::default()
        };
        let encoded = hash(b"secret1", &config).unwrap();
        assert!(verify(&encoded, b"secret1", &config).unwrap());
        assert!(!verify(&encoded, b"secret2", &config).unwrap());
    }
}
