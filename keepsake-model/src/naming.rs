use crate::{ModelError, ModelResult};
use std::fmt;
use std::sync::Arc;

/// Extension used by [`FileNaming::default`].
pub const DEFAULT_EXTENSION: &str = "json";

type NameFn = dyn Fn(&str) -> String + Send + Sync;

/// Strategy mapping an entity type name to the file holding its collection.
///
/// Defaults to `"{TypeName}.json"`. Clones share the underlying function.
#[derive(Clone)]
pub struct FileNaming {
    name_fn: Arc<NameFn>,
    label: String,
}

impl FileNaming {
    /// `"{TypeName}.{extension}"`.
    pub fn with_extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let label = format!("{{TypeName}}.{extension}");
        Self {
            name_fn: Arc::new(move |type_name| format!("{type_name}.{extension}")),
            label,
        }
    }

    /// Any caller-supplied mapping.
    pub fn custom<F>(name_fn: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name_fn: Arc::new(name_fn),
            label: "custom".to_string(),
        }
    }

    /// Resolves the file name for `type_name`.
    ///
    /// Fails when the type name is empty or the strategy produces something
    /// that is not a plain file name inside the root directory.
    pub fn file_name(&self, type_name: &str) -> ModelResult<String> {
        if type_name.is_empty() {
            return Err(ModelError::EmptyTypeName);
        }
        let name = (self.name_fn)(type_name);
        if name.is_empty() {
            return Err(ModelError::EmptyFileName {
                type_name: type_name.to_string(),
            });
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ModelError::InvalidFileName {
                type_name: type_name.to_string(),
                file_name: name,
            });
        }
        Ok(name)
    }
}

impl Default for FileNaming {
    fn default() -> Self {
        Self::with_extension(DEFAULT_EXTENSION)
    }
}

impl fmt::Debug for FileNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileNaming").field(&self.label).finish()
    }
}
