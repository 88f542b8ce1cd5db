//! Signed cookies carrying the logged-in user and flash messages
//!
//! A cookie value is `base64(json) "." base64(hmac-sha256(json))`, the json
//! holding the payload and its expiry. Anything that fails the signature or
//! has expired reads as absent.

use crate::config::SessionConfig;
use anyhow::{anyhow, Error};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Flash messages only need to survive one redirect
const FLASH_MAX_AGE: i64 = 300;

#[derive(Serialize, Deserialize)]
struct Sealed<T> {
    exp: i64,
    val: T,
}

#[derive(Serialize, Deserialize)]
struct Session {
    user: String,
}

pub struct SessionStore {
    mac: HmacSha256,
    max_age: i64,
    secure: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Result<Self, Error> {
        let key: [u8; 32] = match &config.secret {
            Some(secret) => Sha256::digest(secret.as_bytes()).into(),
            None => {
                let mut key = [0; 32];
                rand::thread_rng().fill(&mut key[..]);
                key
            }
        };
        let mac = HmacSha256::new_from_slice(&key).map_err(|e| anyhow!("session key: {}", e))?;

        Ok(Self {
            mac,
            max_age: config.max_age,
            secure: config.secure,
        })
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn seal<T: Serialize>(&self, val: T, max_age: i64) -> Result<String, Error> {
        let json = serde_json::to_vec(&Sealed {
            exp: Utc::now().timestamp() + max_age,
            val,
        })?;
        let sig = self.sign(&json);
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&json),
            URL_SAFE_NO_PAD.encode(sig)
        ))
    }

    fn open<T: DeserializeOwned>(&self, raw: &str) -> Option<T> {
        let (data, sig) = raw.split_once('.')?;
        let json = URL_SAFE_NO_PAD.decode(data).ok()?;
        let sig = URL_SAFE_NO_PAD.decode(sig).ok()?;

        let mut mac = self.mac.clone();
        mac.update(&json);
        mac.verify_slice(&sig).ok()?;

        let sealed: Sealed<T> = serde_json::from_slice(&json).ok()?;
        if sealed.exp <= Utc::now().timestamp() {
            return None;
        }
        Some(sealed.val)
    }

    fn cookie(&self, name: &str, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value logging `username` in
    pub fn login(&self, username: &str) -> Result<String, Error> {
        let value = self.seal(
            Session {
                user: username.to_owned(),
            },
            self.max_age,
        )?;
        Ok(self.cookie(SESSION_COOKIE, &value, self.max_age))
    }

    /// `Set-Cookie` value ending the session
    pub fn logout(&self) -> String {
        self.cookie(SESSION_COOKIE, "", 0)
    }

    /// Username stored in a valid, unexpired session cookie
    pub fn user(&self, cookie: &str) -> Option<String> {
        self.open::<Session>(cookie).map(|s| s.user)
    }

    pub fn set_flash(&self, message: &str) -> Result<String, Error> {
        let value = self.seal(message, FLASH_MAX_AGE)?;
        Ok(self.cookie(FLASH_COOKIE, &value, FLASH_MAX_AGE))
    }

    pub fn flash(&self, cookie: &str) -> Option<String> {
        self.open(cookie)
    }

    pub fn clear_flash(&self) -> String {
        self.cookie(FLASH_COOKIE, "", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(secret: &str) -> SessionStore {
        SessionStore::new(&SessionConfig {
            secret: Some(secret.to_owned()),
            ..Default::default()
        })
        .unwrap()
    }

    fn value(set_cookie: &str) -> &str {
        let pair = set_cookie.split(';').next().unwrap();
        pair.split_once('=').unwrap().1
    }

    #[test]
    fn login_cookie_reads_back() {
        let store = store("secret");
        let cookie = store.login("alice").unwrap();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        assert_eq!(store.user(value(&cookie)).as_deref(), Some("alice"));
    }

    #[test]
    fn foreign_or_tampered_cookies_are_ignored() {
        let cookie = store("secret").login("alice").unwrap();
        assert_eq!(store("other").user(value(&cookie)), None);

        let forged = URL_SAFE_NO_PAD.encode(br#"{"exp":99999999999,"val":{"user":"bob"}}"#);
        let (_, sig) = value(&cookie).split_once('.').unwrap();
        assert_eq!(store("secret").user(&format!("{}.{}", forged, sig)), None);
        assert_eq!(store("secret").user("garbage"), None);
    }

    #[test]
    fn expired_sessions_are_ignored() {
        let store = SessionStore::new(&SessionConfig {
            secret: Some("secret".to_owned()),
            max_age: -1,
            secure: true,
        })
        .unwrap();
        let cookie = store.login("alice").unwrap();
        assert!(cookie.ends_with("; Secure"));
        assert_eq!(store.user(value(&cookie)), None);
    }

    #[test]
    fn flash_messages() {
        let store = store("secret");
        let cookie = store.set_flash("hello").unwrap();
        assert_eq!(store.flash(value(&cookie)).as_deref(), Some("hello"));
        assert_eq!(value(&store.clear_flash()), "");
    }
}
