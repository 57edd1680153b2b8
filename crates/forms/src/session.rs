//! Session lifecycle: validate, ensure key, restore, then persist on save.

use std::{fmt, sync::Arc};

use {
    formstash_common::StorageKind,
    formstash_config::{FormStashConfig, KdfConfig, Severity, check_semantics, data_dir},
    formstash_storage::{Backends, CookieJar, FileStore, MemoryStore, StorageAdapter},
    formstash_vault::{KdfParams, PassphraseCipher, XChaCha20PassphraseCipher},
    tracing::{debug, info, warn},
};

use crate::{
    codec::ValueCodec,
    error::{Error, Result},
    field::FormScope,
    key::{KeyManager, RESERVED_KEY},
    options::SessionOptions,
    serializer::FieldSerializer,
    store::RecordStore,
};

/// File name of the default durable store inside the data directory.
const DURABLE_FILE: &str = "durable.json";

/// Where a [`SessionController`] is in its lifecycle.
///
/// `Unvalidated -> Validated -> KeyReady -> Loaded -> Listening`, with
/// `Rejected` reachable only from `Unvalidated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Unvalidated,
    Validated,
    KeyReady,
    Loaded,
    Listening,
    Rejected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unvalidated => "unvalidated",
            Self::Validated => "validated",
            Self::KeyReady => "key-ready",
            Self::Loaded => "loaded",
            Self::Listening => "listening",
            Self::Rejected => "rejected",
        })
    }
}

// ── Environment ─────────────────────────────────────────────────────────────

/// Collaborators the host provides: storage backends and, optionally, a
/// cipher.
#[derive(Clone, Default)]
pub struct Environment {
    pub backends: Backends,
    pub cipher: Option<Arc<dyn PassphraseCipher>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("backends", &self.backends)
            .field("cipher", &self.cipher.is_some())
            .finish()
    }
}

impl Environment {
    pub fn new(backends: Backends) -> Self {
        Self {
            backends,
            cipher: None,
        }
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: impl PassphraseCipher + 'static) -> Self {
        self.cipher = Some(Arc::new(cipher));
        self
    }

    /// Use the built-in XChaCha20-Poly1305 cipher with the given KDF costs.
    #[must_use]
    pub fn with_default_cipher(self, kdf: &KdfConfig) -> Self {
        self.with_cipher(XChaCha20PassphraseCipher::with_params(KdfParams {
            m_cost: kdf.m_cost,
            t_cost: kdf.t_cost,
            p_cost: kdf.p_cost,
        }))
    }

    #[must_use]
    pub fn with_cookies(mut self, jar: impl CookieJar + 'static) -> Self {
        self.backends = self.backends.with_cookies(jar);
        self
    }

    /// Backends described by `config`: a file-backed durable store (at
    /// `durable.path`, else in the user data directory), an in-memory
    /// session store, and the default cipher when encryption is on.
    ///
    /// No cookie jar is created; hosts that have one add it with
    /// [`Environment::with_cookies`].
    pub fn from_config(config: &FormStashConfig) -> Self {
        let mut backends = Backends::new();

        match config
            .durable
            .path
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join(DURABLE_FILE)))
        {
            Some(path) => {
                debug!(path = %path.display(), "using file-backed durable store");
                backends = backends.with_durable(FileStore::new(path));
            },
            None => debug!("no data directory, durable store unavailable"),
        }

        let session = match config.session.quota_bytes {
            Some(quota) => MemoryStore::with_quota(quota),
            None => MemoryStore::new(),
        };
        let env = Self::new(backends.with_session(session));

        if config.encryption.enabled {
            env.with_default_cipher(&config.encryption.kdf)
        } else {
            env
        }
    }
}

// ── SessionController ───────────────────────────────────────────────────────

/// Drives one form through the session lifecycle.
pub struct SessionController {
    opts: SessionOptions,
    adapter: StorageAdapter,
    serializer: FieldSerializer,
    has_cipher: bool,
    state: SessionState,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("opts", &self.opts)
            .field("adapter", &self.adapter)
            .field("state", &self.state)
            .finish()
    }
}

impl SessionController {
    pub fn new(opts: SessionOptions, env: Environment) -> Self {
        let has_cipher = env.cipher.is_some();
        Self {
            opts,
            adapter: StorageAdapter::new(env.backends),
            serializer: FieldSerializer::new(ValueCodec::new(env.cipher)),
            has_cipher,
            state: SessionState::Unvalidated,
        }
    }

    /// Controller for a loaded config file. Settings the validator reports
    /// as errors are rejected up front.
    pub fn from_config(config: &FormStashConfig, env: Environment) -> Result<Self> {
        let reasons: Vec<String> = check_semantics(config)
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {}", d.path, d.message))
            .collect();
        if !reasons.is_empty() {
            warn!(app_id = %config.app_id, reasons = ?reasons, "configuration rejected");
            return Err(Error::Rejected { reasons });
        }
        Ok(Self::new(SessionOptions::from(config), env))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.opts
    }

    pub fn adapter(&self) -> &StorageAdapter {
        &self.adapter
    }

    /// Backend that requests for the configured kind actually reach.
    pub fn backend_in_use(&self) -> Option<StorageKind> {
        self.adapter.resolve_backend(self.opts.storage).0.kind()
    }

    /// Whether the configured backend was replaced by the cookie fallback.
    pub fn downgraded(&self) -> bool {
        self.adapter.resolve_backend(self.opts.storage).1
    }

    /// Reasons the environment cannot serve the configured mode.
    fn rejection_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.opts.app_id.is_empty() {
            reasons.push("app_id must not be empty".to_string());
        } else if self.opts.app_id == RESERVED_KEY {
            reasons.push(format!(
                "app_id \"{RESERVED_KEY}\" collides with the encryption key entry"
            ));
        }
        if self.opts.encryption_enabled && !self.has_cipher {
            reasons.push("encryption is enabled but no cipher is available".to_string());
        }
        if self.opts.storage == StorageKind::Cookie
            && !self.adapter.backends().is_available(StorageKind::Cookie)
        {
            reasons.push("cookie storage requested but no cookie jar is available".to_string());
        }
        reasons
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                state: self.state,
                expected,
            })
        }
    }

    /// Run the lifecycle up to `Listening`: validate, ensure the key, and
    /// restore the last saved values into `form`.
    ///
    /// A rejected configuration leaves storage untouched.
    pub fn init(&mut self, form: &mut dyn FormScope) -> Result<()> {
        self.expect_state(SessionState::Unvalidated)?;

        let reasons = self.rejection_reasons();
        if !reasons.is_empty() {
            warn!(app_id = %self.opts.app_id, reasons = ?reasons, "configuration rejected");
            self.state = SessionState::Rejected;
            return Err(Error::Rejected { reasons });
        }
        self.state = SessionState::Validated;

        let (handle, downgraded) = self.adapter.resolve_backend(self.opts.storage);
        if downgraded {
            warn!(
                app_id = %self.opts.app_id,
                requested = %self.opts.storage,
                backend = ?handle.kind(),
                "requested storage unavailable, using fallback"
            );
        }

        self.opts = KeyManager::new(&self.adapter).ensure_key(self.opts.clone());
        self.state = SessionState::KeyReady;

        let form_id = form.form_id().to_string();
        let record = RecordStore::new(&self.adapter, &self.opts).load(&form_id);
        let values = self.serializer.restore(&record, &self.opts);
        let applied = if values.is_empty() {
            0
        } else {
            form.populate(&values)
        };
        self.state = SessionState::Loaded;

        info!(
            app_id = %self.opts.app_id,
            form_id = %form_id,
            backend = ?self.backend_in_use(),
            encrypted = self.opts.encryption_enabled,
            stored = record.len(),
            restored = applied,
            "form session ready"
        );
        self.state = SessionState::Listening;
        Ok(())
    }

    /// Persist the current values of `form`, merged over what was saved
    /// before. Fields left empty this time keep their last saved value.
    pub fn handle_save(&self, form: &dyn FormScope) -> Result<()> {
        self.expect_state(SessionState::Listening)?;

        let form_id = form.form_id();
        let collected = self
            .serializer
            .collect(&form.list_persistable_fields(), &self.opts)?;
        let store = RecordStore::new(&self.adapter, &self.opts);
        let merged = store.load(form_id).merged_with(collected);

        store.save(form_id, &merged).inspect_err(|e| {
            warn!(app_id = %self.opts.app_id, form_id, error = %e, "failed to save form");
        })
    }
}
