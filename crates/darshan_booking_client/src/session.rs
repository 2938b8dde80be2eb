//! Frappe session cookie handling.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

const SESSION_COOKIE: &str = "sid";
/// Frappe hands this `sid` to anonymous visitors and on logout.
const GUEST_SID: &str = "Guest";

/// Value of cookie `name` in a `Cookie` or `Set-Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

/// The logged-in session, shared by every clone of a client.
#[derive(Clone, Debug, Default)]
pub struct Session {
    sid: Arc<RwLock<Option<SecretString>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known `sid`, e.g. one restored by the host.
    pub fn with_sid(sid: SecretString) -> Self {
        Self {
            sid: Arc::new(RwLock::new(Some(sid))),
        }
    }

    /// Take the `sid` from a response's `Set-Cookie` headers.
    ///
    /// A guest `sid` ends the session. Returns whether a user session is held.
    pub async fn capture<'a, I>(&self, set_cookie_headers: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(sid) = set_cookie_headers
            .into_iter()
            .find_map(|h| cookie_value(h, SESSION_COOKIE))
        else {
            return self.is_authenticated().await;
        };

        let mut guard = self.sid.write().await;
        if sid.is_empty() || sid == GUEST_SID {
            *guard = None;
            false
        } else {
            *guard = Some(SecretString::new(sid.into()));
            true
        }
    }

    /// `Cookie` header value to send, if a user session is held.
    pub async fn cookie_header(&self) -> Option<String> {
        self.sid
            .read()
            .await
            .as_ref()
            .map(|sid| format!("{SESSION_COOKIE}={}", sid.expose_secret()))
    }

    pub async fn is_authenticated(&self) -> bool {
        self.sid.read().await.is_some()
    }

    pub async fn clear(&self) {
        *self.sid.write().await = None;
    }
}
