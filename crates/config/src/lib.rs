//! Configuration loading, env substitution, and validation.
//!
//! Config files: `formstash.toml`, `formstash.yaml`, or `formstash.json`,
//! searched in `./` then the user config directory.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, data_dir, discover_and_load, find_config_file, load_config, parse_config},
    schema::{
        DEFAULT_APP_ID, DurableConfig, EncryptionConfig, FormStashConfig, KdfConfig,
        RESERVED_KEY_NAME, SessionStoreConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, check_semantics, validate, validate_str},
};
