//! Configuration validation.
//!
//! Checks a config file for syntax, unknown or misspelled fields, type
//! errors, and settings that parse but cannot work together.

use std::path::{Path, PathBuf};

use {formstash_common::StorageKind, serde_json::Value};

use crate::schema::{FormStashConfig, RESERVED_KEY_NAME};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// One of "syntax", "unknown-field", "type-error", "semantic", "security".
    pub category: &'static str,
    /// Dotted path, e.g. "encryption.kdf.m_cost".
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Known keys ──────────────────────────────────────────────────────────────

const TOP_LEVEL: &[&str] = &[
    "app_id",
    "storage",
    "layout",
    "encryption",
    "durable",
    "session",
];
const ENCRYPTION: &[&str] = &["enabled", "key_seed", "kdf"];
const KDF: &[&str] = &["m_cost", "t_cost", "p_cost"];
const DURABLE: &[&str] = &["path"];
const SESSION: &[&str] = &["quota_bytes"];

fn known_keys(path: &str) -> Option<&'static [&'static str]> {
    match path {
        "" => Some(TOP_LEVEL),
        "encryption" => Some(ENCRYPTION),
        "encryption.kdf" => Some(KDF),
        "durable" => Some(DURABLE),
        "session" => Some(SESSION),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev[b.len()]
}

/// Closest known key within `max_distance` edits.
fn suggest<'a>(key: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(key, c)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

fn check_unknown_fields(value: &Value, prefix: &str, diagnostics: &mut Vec<Diagnostic>) {
    let (Value::Object(map), Some(known)) = (value, known_keys(prefix)) else {
        return;
    };
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if known.contains(&key.as_str()) {
            check_unknown_fields(child, &path, diagnostics);
            continue;
        }
        let message = match suggest(key, known, 3) {
            Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
            None => "unknown field".to_string(),
        };
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "unknown-field",
            path,
            message,
        ));
    }
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate the config file at `path`, or the discovered one when `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(crate::loader::find_config_file);

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "syntax",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    let mut result = match std::fs::read_to_string(&actual_path) {
        Ok(raw) => validate_str(&crate::env_subst::substitute_env(&raw), &actual_path),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            )],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate raw config text; the format is taken from `path`'s extension.
#[must_use]
pub fn validate_str(raw: &str, path: &Path) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let value = match parse_value(raw, path) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    check_unknown_fields(&value, "", &mut diagnostics);

    match serde_json::from_value::<FormStashConfig>(value) {
        Ok(config) => diagnostics.extend(check_semantics(&config)),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn parse_value(raw: &str, path: &Path) -> anyhow::Result<Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match ext {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Checks on a parsed config that serde cannot express.
#[must_use]
pub fn check_semantics(config: &FormStashConfig) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    if config.app_id.is_empty() {
        out.push(Diagnostic::new(
            Severity::Error,
            "semantic",
            "app_id",
            "app_id must not be empty",
        ));
    } else if config.app_id == RESERVED_KEY_NAME {
        out.push(Diagnostic::new(
            Severity::Error,
            "semantic",
            "app_id",
            format!("app_id \"{RESERVED_KEY_NAME}\" collides with the encryption key entry"),
        ));
    }

    let enc = &config.encryption;
    if enc.seed().is_some() && !enc.enabled {
        out.push(Diagnostic::new(
            Severity::Warning,
            "semantic",
            "encryption.key_seed",
            "key_seed is ignored while encryption is disabled",
        ));
    }
    if let Some(seed) = enc.seed()
        && seed.chars().count() < 12
    {
        out.push(Diagnostic::new(
            Severity::Warning,
            "security",
            "encryption.key_seed",
            "key_seed is shorter than 12 characters",
        ));
    }

    if enc.kdf.t_cost == 0 {
        out.push(Diagnostic::new(
            Severity::Error,
            "semantic",
            "encryption.kdf.t_cost",
            "t_cost must be at least 1",
        ));
    }
    if enc.kdf.p_cost == 0 || enc.kdf.m_cost < 8 * enc.kdf.p_cost {
        out.push(Diagnostic::new(
            Severity::Error,
            "semantic",
            "encryption.kdf.m_cost",
            "m_cost must be at least 8 KiB per lane and p_cost at least 1",
        ));
    }

    if config.storage == StorageKind::Cookie && enc.enabled {
        out.push(Diagnostic::new(
            Severity::Warning,
            "semantic",
            "storage",
            "encrypted values roughly double in size; cookie records are capped at 4096 bytes",
        ));
    }

    if config.durable.path.is_some() && config.storage != StorageKind::Durable {
        out.push(Diagnostic::new(
            Severity::Info,
            "semantic",
            "durable.path",
            format!("durable.path is unused while storage is \"{}\"", config.storage),
        ));
    }

    out
}
