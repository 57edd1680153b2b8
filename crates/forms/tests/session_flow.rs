#![allow(clippy::unwrap_used, clippy::expect_used)]
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use {
    formstash::{
        Envelope, Environment, Error, Field, FieldKind, FormScope, MemoryForm, RESERVED_KEY,
        SessionController, SessionOptions, SessionState,
    },
    formstash_common::{StorageKind, StorageLayout},
    formstash_config::{FormStashConfig, parse_config},
    formstash_storage::{
        Backends, CookieJar, FileStore, KeyValueStore, MemoryCookieJar, MemoryStore,
    },
    formstash_vault::{KdfParams, XChaCha20PassphraseCipher},
};

fn cheap_cipher() -> XChaCha20PassphraseCipher {
    XChaCha20PassphraseCipher::with_params(KdfParams {
        m_cost: 256,
        t_cost: 1,
        p_cost: 1,
    })
}

fn contact(name: &str, email: &str) -> MemoryForm {
    MemoryForm::new("contact")
        .with_field(Field::text("name", name))
        .with_field(Field::new("email", FieldKind::Email, email))
        .with_field(Field::choice("plan", FieldKind::Radio, "free", false))
        .with_field(Field::choice("plan", FieldKind::Radio, "pro", false))
        .with_field(Field::new("send", FieldKind::Submit, "Send"))
}

/// Open a session on `form` the way a page load would.
fn open(opts: SessionOptions, env: Environment, form: &mut MemoryForm) -> SessionController {
    let mut controller = SessionController::new(opts, env);
    controller.init(form).unwrap();
    controller
}

/// Counts writes per key while delegating to a shared in-memory store.
#[derive(Clone, Default)]
struct CountingStore {
    inner: MemoryStore,
    key_writes: Arc<AtomicUsize>,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> formstash_storage::Result<Option<String>> {
        KeyValueStore::get(&self.inner, key)
    }

    fn put(&self, key: &str, value: &str) -> formstash_storage::Result<()> {
        if key == RESERVED_KEY {
            self.key_writes.fetch_add(1, Ordering::SeqCst);
        }
        KeyValueStore::put(&self.inner, key, value)
    }

    fn len(&self) -> formstash_storage::Result<usize> {
        KeyValueStore::len(&self.inner)
    }
}

#[test]
fn values_survive_a_reload() {
    let durable = MemoryStore::new();
    let env = || Environment::new(Backends::new().with_durable(durable.clone()));

    let mut first = contact("", "");
    let controller = open(SessionOptions::default(), env(), &mut first);
    first.set_value("name", "Ada");
    first.set_value("email", "ada@example.com");
    first.set_value("plan", "pro");
    controller.handle_save(&first).unwrap();

    let mut reloaded = contact("", "");
    let controller = open(SessionOptions::default(), env(), &mut reloaded);
    assert_eq!(controller.state(), SessionState::Listening);
    assert_eq!(reloaded.value("name"), Some("Ada"));
    assert_eq!(reloaded.value("email"), Some("ada@example.com"));
    assert_eq!(reloaded.value("plan"), Some("pro"));
    assert_eq!(reloaded.value("send"), Some("Send"));
}

#[test]
fn save_merges_over_prior_record() {
    let durable = MemoryStore::new();
    let env = || Environment::new(Backends::new().with_durable(durable.clone()));
    let opts = SessionOptions::new("merge", StorageKind::Durable);

    let ab = MemoryForm::new("f")
        .with_field(Field::text("a", "1"))
        .with_field(Field::text("b", "2"));
    let mut page = ab.clone();
    open(opts.clone(), env(), &mut page).handle_save(&ab).unwrap();

    let bc = MemoryForm::new("f")
        .with_field(Field::text("a", ""))
        .with_field(Field::text("b", "3"))
        .with_field(Field::text("c", "4"));
    let mut page = bc.clone();
    // `a` is left empty this time, so its stored value must survive.
    open(opts, env(), &mut page).handle_save(&bc).unwrap();

    let raw = durable.get("merge").unwrap().unwrap();
    let Envelope::Blob { forms, .. } = Envelope::parse(&raw, StorageLayout::Blob).unwrap() else {
        panic!("expected a blob envelope");
    };
    let record = &forms["f"];
    assert_eq!(record.get("a"), Some("1"));
    assert_eq!(record.get("b"), Some("3"));
    assert_eq!(record.get("c"), Some("4"));
    assert_eq!(record.len(), 3);
}

#[test]
fn encrypted_values_are_opaque_at_rest() {
    let durable = MemoryStore::new();
    let env = || {
        Environment::new(Backends::new().with_durable(durable.clone())).with_cipher(cheap_cipher())
    };
    let opts = SessionOptions::new("secure", StorageKind::Durable).with_encryption(true);

    let mut page = contact("", "");
    let controller = open(opts.clone(), env(), &mut page);
    let key = controller.options().key().unwrap().to_string();
    assert_eq!(key.len(), 36);
    controller
        .handle_save(&contact("Grace", "grace@example.com"))
        .unwrap();

    let raw = durable.get("secure").unwrap().unwrap();
    assert!(!raw.contains("grace@example.com"));
    assert!(!raw.contains("Grace"));
    assert_eq!(durable.get(RESERVED_KEY).unwrap(), Some(key.clone()));

    let mut reloaded = contact("", "");
    let controller = open(opts, env(), &mut reloaded);
    assert_eq!(controller.options().key(), Some(key.as_str()));
    assert_eq!(reloaded.value("email"), Some("grace@example.com"));
    assert_eq!(reloaded.value("name"), Some("Grace"));
}

#[test]
fn key_is_written_exactly_once() {
    let store = CountingStore::default();
    let writes = Arc::clone(&store.key_writes);
    let opts = SessionOptions::new("once", StorageKind::Durable).with_encryption(true);

    for _ in 0..3 {
        let env = Environment::new(Backends::new().with_durable(store.clone()))
            .with_cipher(cheap_cipher());
        let controller = open(opts.clone(), env, &mut contact("", ""));
        controller.handle_save(&contact("Ada", "")).unwrap();
    }
    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[test]
fn rejected_configuration_writes_nothing() {
    let durable = MemoryStore::new();
    let env = Environment::new(Backends::new().with_durable(durable.clone()));
    let mut page = contact("Ada", "");
    let mut controller = SessionController::new(
        SessionOptions::default().with_encryption(true).with_key_seed("long enough seed"),
        env,
    );

    assert!(matches!(controller.init(&mut page), Err(Error::Rejected { .. })));
    assert!(matches!(
        controller.handle_save(&page),
        Err(Error::InvalidState {
            state: SessionState::Rejected,
            ..
        })
    ));
    assert!(durable.is_empty().unwrap());
}

#[test]
fn cookie_fallback_keeps_working() {
    let jar = MemoryCookieJar::new();
    let env = || Environment::default().with_cookies(jar.clone());
    let opts = SessionOptions::new("crumbs", StorageKind::Session);

    let controller = open(opts.clone(), env(), &mut contact("", ""));
    assert!(controller.downgraded());
    controller.handle_save(&contact("Ada", "")).unwrap();
    assert!(CookieJar::get(&jar, "crumbs").unwrap().is_some());

    let mut reloaded = contact("", "");
    open(opts, env(), &mut reloaded);
    assert_eq!(reloaded.value("name"), Some("Ada"));
}

#[test]
fn oversized_cookie_record_fails_the_save() {
    let jar = MemoryCookieJar::new();
    let env = Environment::default().with_cookies(jar);
    let controller = open(
        SessionOptions::new("big", StorageKind::Cookie),
        env,
        &mut contact("", ""),
    );
    let huge = "x".repeat(5000);
    assert!(matches!(
        controller.handle_save(&contact(&huge, "")),
        Err(Error::WriteFailed { .. })
    ));
}

#[test]
fn per_field_layout_round_trip() {
    let session = MemoryStore::new();
    let env = || Environment::new(Backends::new().with_session(session.clone()));
    let opts =
        SessionOptions::new("split", StorageKind::Session).with_layout(StorageLayout::PerField);

    let controller = open(opts.clone(), env(), &mut contact("", ""));
    controller
        .handle_save(&contact("Ada", "ada@example.com"))
        .unwrap();
    assert_eq!(
        session.get("split.contact.email").unwrap().as_deref(),
        Some("ada@example.com")
    );

    let mut reloaded = contact("", "");
    open(opts, env(), &mut reloaded);
    assert_eq!(reloaded.value("email"), Some("ada@example.com"));
}

#[test]
fn file_store_persists_between_processes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("durable.json");
    let config: FormStashConfig = parse_config(
        &format!(
            "app_id = \"profile\"\n[durable]\npath = {:?}\n",
            path.to_string_lossy()
        ),
        std::path::Path::new("formstash.toml"),
    )
    .unwrap();

    let mut controller =
        SessionController::from_config(&config, Environment::from_config(&config)).unwrap();
    controller.init(&mut contact("", "")).unwrap();
    controller.handle_save(&contact("Ada", "")).unwrap();
    assert!(path.exists());

    let store = FileStore::new(&path);
    let env = Environment::new(Backends::new().with_durable(store));
    let mut reloaded = contact("", "");
    open(SessionOptions::from(&config), env, &mut reloaded);
    assert_eq!(reloaded.value("name"), Some("Ada"));
}
