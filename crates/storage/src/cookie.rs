//! In-memory cookie jar with expiry and the per-cookie size limit.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, SystemTime},
};

use crate::{
    error::{Error, Result},
    traits::CookieJar,
};

/// Largest cookie (name plus value) a jar accepts.
pub const MAX_COOKIE_BYTES: usize = 4096;

#[derive(Debug, Clone)]
struct Cookie {
    value: String,
    expires_at: SystemTime,
}

impl Cookie {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }
}

/// Cookie jar held in memory. Clones share the same cookies.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Arc<RwLock<HashMap<String, Cookie>>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry of a live cookie, if any.
    pub fn expires_at(&self, name: &str) -> Option<SystemTime> {
        let now = SystemTime::now();
        let cookies = self.cookies.read().unwrap_or_else(|e| e.into_inner());
        cookies
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.expires_at)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let now = SystemTime::now();
        let cookies = self.cookies.read().unwrap_or_else(|e| e.into_inner());
        Ok(cookies
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.value.clone()))
    }

    fn put(&self, name: &str, value: &str, ttl: Duration) -> Result<()> {
        let len = name.len() + value.len();
        if len > MAX_COOKIE_BYTES {
            return Err(Error::CookieTooLarge {
                name: name.to_string(),
                len,
                max: MAX_COOKIE_BYTES,
            });
        }

        let now = SystemTime::now();
        let mut cookies = self.cookies.write().unwrap_or_else(|e| e.into_inner());
        cookies.retain(|_, c| c.is_live(now));
        cookies.insert(name.to_string(), Cookie {
            value: value.to_string(),
            expires_at: now + ttl,
        });
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let now = SystemTime::now();
        let cookies = self.cookies.read().unwrap_or_else(|e| e.into_inner());
        Ok(cookies.values().filter(|c| c.is_live(now)).count())
    }
}
