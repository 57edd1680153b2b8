//! Backend availability and fallback.

use std::{fmt, sync::Arc};

use {formstash_common::StorageKind, tracing::debug};

use crate::traits::{CookieJar, KeyValueStore};

/// The storage collaborators present in this environment.
///
/// Any of them may be missing; [`Backends::resolve`] decides what a request
/// for a given kind actually gets.
#[derive(Clone, Default)]
pub struct Backends {
    pub durable: Option<Arc<dyn KeyValueStore>>,
    pub session: Option<Arc<dyn KeyValueStore>>,
    pub cookies: Option<Arc<dyn CookieJar>>,
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("durable", &self.durable.is_some())
            .field("session", &self.session.is_some())
            .field("cookies", &self.cookies.is_some())
            .finish()
    }
}

/// A resolved backend, borrowed from [`Backends`].
#[derive(Clone, Copy)]
pub enum BackendHandle<'a> {
    Store {
        kind: StorageKind,
        store: &'a dyn KeyValueStore,
    },
    Cookie(&'a dyn CookieJar),
    /// Neither the requested backend nor the cookie fallback is usable.
    Unavailable,
}

impl BackendHandle<'_> {
    /// Kind actually in use, `None` when unavailable.
    #[must_use]
    pub fn kind(&self) -> Option<StorageKind> {
        match self {
            Self::Store { kind, .. } => Some(*kind),
            Self::Cookie(_) => Some(StorageKind::Cookie),
            Self::Unavailable => None,
        }
    }
}

impl fmt::Debug for BackendHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "BackendHandle({kind})"),
            None => f.write_str("BackendHandle(unavailable)"),
        }
    }
}

impl Backends {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_durable(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.durable = Some(Arc::new(store));
        self
    }

    #[must_use]
    pub fn with_session(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.session = Some(Arc::new(store));
        self
    }

    #[must_use]
    pub fn with_cookies(mut self, jar: impl CookieJar + 'static) -> Self {
        self.cookies = Some(Arc::new(jar));
        self
    }

    /// Whether `kind` is present and passes its probe.
    #[must_use]
    pub fn is_available(&self, kind: StorageKind) -> bool {
        match kind {
            StorageKind::Durable => self.durable.as_ref().is_some_and(|s| s.probe()),
            StorageKind::Session => self.session.as_ref().is_some_and(|s| s.probe()),
            StorageKind::Cookie => self.cookies.as_ref().is_some_and(|j| j.probe()),
        }
    }

    /// Resolve `requested` to a usable backend.
    ///
    /// Returns the handle and whether it is a downgrade from what was asked
    /// for. An unavailable durable or session store falls back to cookies;
    /// when cookies are unusable too the handle is
    /// [`BackendHandle::Unavailable`].
    pub fn resolve(&self, requested: StorageKind) -> (BackendHandle<'_>, bool) {
        if self.is_available(requested) {
            return (self.handle(requested), false);
        }

        debug!(requested = %requested, "storage backend unavailable, falling back to cookies");
        if requested != StorageKind::Cookie && self.is_available(StorageKind::Cookie) {
            (self.handle(StorageKind::Cookie), true)
        } else {
            (BackendHandle::Unavailable, true)
        }
    }

    fn handle(&self, kind: StorageKind) -> BackendHandle<'_> {
        let store = match kind {
            StorageKind::Durable => self.durable.as_deref(),
            StorageKind::Session => self.session.as_deref(),
            StorageKind::Cookie => {
                return self
                    .cookies
                    .as_deref()
                    .map_or(BackendHandle::Unavailable, BackendHandle::Cookie);
            },
        };
        store.map_or(BackendHandle::Unavailable, |store| BackendHandle::Store {
            kind,
            store,
        })
    }
}
