// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generator configuration and its storage port.
//!
//! Precedence, lowest first: built-in defaults, the JSON config file, CLI
//! flags (applied by the binary).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Input read by a no-argument run.
pub const DEFAULT_INPUT: &str = "schemaorg-current-https.jsonld";
/// Output written by a no-argument run.
pub const DEFAULT_OUTPUT: &str = "structschema.rs";
/// Module name advertised in the generated banner.
pub const DEFAULT_MODULE: &str = "structschema";
/// Config key looked up in the working directory (`schemagen.json`).
pub const DEFAULT_CONFIG_KEY: &str = "schemagen";

/// Path value meaning stdin (for input) or stdout (for output).
pub const STDIO: &str = "-";

/// Read-only storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// A config the caller asked for explicitly does not exist.
    #[error("config {0} not found")]
    Missing(String),
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Deserializes config values read through a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Reads configs as JSON files in one directory.
///
/// A key without an extension maps to `<key>.json`; a key with one is used
/// as the file name verbatim. Stores built by [`FsConfigStore::for_file`]
/// always use the key verbatim.
pub struct FsConfigStore {
    base: PathBuf,
    verbatim: bool,
}

impl FsConfigStore {
    /// Store rooted at `base` (the working directory for the CLI).
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            verbatim: false,
        }
    }

    /// Store and key addressing exactly the file at `path`.
    pub fn for_file(path: &Path) -> (Self, String) {
        let base = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let key = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        (
            Self {
                base,
                verbatim: true,
            },
            key,
        )
    }

    fn path_for(&self, key: &str) -> PathBuf {
        if self.verbatim || Path::new(key).extension().is_some() {
            self.base.join(key)
        } else {
            self.base.join(format!("{key}.json"))
        }
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let path = self.path_for(key);
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }
}

/// Everything a generation run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// JSON-LD document to read, or `-` for stdin.
    pub input: PathBuf,
    /// Rust file to write, or `-` for stdout.
    pub output: PathBuf,
    /// Module name advertised in the banner.
    pub module: String,
    /// Where to write the resolved-graph diagnostic dump, if anywhere.
    pub dump_graph: Option<PathBuf>,
    /// Emit `CONTEXT_PREFIXES`.
    pub emit_context: bool,
    /// Drop member relations of superseded nodes.
    pub skip_superseded: bool,
    /// Drop member relations of nodes declaring an inverse.
    pub skip_inverse: bool,
    /// Fail on duplicate identifiers.
    pub reject_duplicates: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            module: DEFAULT_MODULE.to_owned(),
            dump_graph: None,
            emit_context: true,
            skip_superseded: false,
            skip_inverse: false,
            reject_duplicates: false,
        }
    }
}

impl GenConfig {
    /// Load `key` from `store`, falling back to defaults when it is missing.
    pub fn load<S: ConfigStore>(store: S, key: &str) -> Result<Self, ConfigError> {
        Ok(ConfigService::new(store).load(key)?.unwrap_or_default())
    }

    /// Load `key` from `store`; a missing config is an error.
    pub fn load_required<S: ConfigStore>(store: S, key: &str) -> Result<Self, ConfigError> {
        ConfigService::new(store)
            .load(key)?
            .ok_or_else(|| ConfigError::Missing(key.to_owned()))
    }
}

/// Whether `path` designates stdin/stdout.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}
