use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::FormStashConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "formstash.toml",
    "formstash.yaml",
    "formstash.yml",
    "formstash.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<FormStashConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./formstash.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/formstash/formstash.{toml,yaml,yml,json}`
///
/// Returns `FormStashConfig::default()` if no config file is found or the
/// one found does not parse.
pub fn discover_and_load() -> FormStashConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    FormStashConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "formstash").map(|d| d.config_dir().to_path_buf())
}

/// Returns the user-global data directory, home of the default durable
/// store file.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "formstash").map(|d| d.data_dir().to_path_buf())
}

/// Parse `raw` in the format named by the extension of `path`.
pub fn parse_config(raw: &str, path: &Path) -> anyhow::Result<FormStashConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, formstash_common::StorageKind};

    #[test]
    fn loads_each_format() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("formstash.toml", "app_id = \"a\"\nstorage = \"cookie\"\n"),
            ("formstash.yaml", "app_id: a\nstorage: cookie\n"),
            ("formstash.json", "{\"app_id\": \"a\", \"storage\": \"cookie\"}"),
        ];
        for (name, body) in cases {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            let cfg = load_config(&path).unwrap();
            assert_eq!(cfg.app_id, "a", "{name}");
            assert_eq!(cfg.storage, StorageKind::Cookie, "{name}");
        }
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = parse_config("", Path::new("formstash.ini")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }

    #[test]
    fn finds_first_matching_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("formstash.json"), "{}").unwrap();
        std::fs::write(dir.path().join("formstash.yaml"), "{}").unwrap();
        assert_eq!(
            find_in(dir.path()).unwrap(),
            dir.path().join("formstash.yaml")
        );
    }

    #[test]
    fn unknown_storage_kind_fails_to_parse() {
        let err = parse_config("storage = \"indexeddb\"", Path::new("x.toml"));
        assert!(err.is_err());
    }
}
