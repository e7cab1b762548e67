//! Store configuration.
//!
//! [`StoreConfig`] is what [`Store::open`](crate::Store::open) consumes.
//! [`StoreSettings`] is its serializable form for applications that keep
//! store settings in a JSON document.

use crate::DbResult;
use keepsake_model::{FileNaming, DEFAULT_EXTENSION};
use keepsake_storage::JsonCodec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration for a [`Store`](crate::Store).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one file per entity type.
    pub root: PathBuf,
    /// Maps an entity type name to its file name.
    pub naming: FileNaming,
    /// Pretty-print collection files.
    pub pretty: bool,
}

impl StoreConfig {
    /// `"{TypeName}.json"` files, pretty-printed, under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            naming: FileNaming::default(),
            pretty: true,
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The codec implied by `pretty`.
    #[must_use]
    pub fn codec(&self) -> JsonCodec {
        if self.pretty {
            JsonCodec::pretty()
        } else {
            JsonCodec::compact()
        }
    }
}

/// Serializable store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub root: PathBuf,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_pretty() -> bool {
    true
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl StoreSettings {
    /// Parses settings from a JSON document.
    pub fn from_json(json: &str) -> DbResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<StoreSettings> for StoreConfig {
    fn from(settings: StoreSettings) -> Self {
        Self::new(settings.root)
            .with_pretty(settings.pretty)
            .with_naming(FileNaming::with_extension(settings.extension))
    }
}
