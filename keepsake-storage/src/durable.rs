use crate::{StorageBackend, StorageResult};
use tracing::{debug, warn};

/// Suffix appended to a target name while its replacement is being written.
pub const TEMP_SUFFIX: &str = ".tmp";

/// `"{name}.tmp"`.
pub fn temp_name(name: &str) -> String {
    format!("{name}{TEMP_SUFFIX}")
}

/// Writes `bytes` to `"{name}.tmp"` and renames it over `name`.
///
/// `name` is never written directly, so it always holds either the previous
/// contents or the new contents. On failure the temp file is removed on a
/// best-effort basis and the original error is returned.
pub fn write_durable(backend: &dyn StorageBackend, name: &str, bytes: &[u8]) -> StorageResult<()> {
    let tmp = temp_name(name);

    let result = backend
        .write(&tmp, bytes)
        .and_then(|()| backend.replace(&tmp, name));

    match result {
        Ok(()) => {
            debug!(file = %name, bytes = bytes.len(), "Replaced file");
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = backend.remove(&tmp) {
                warn!(file = %tmp, error = %cleanup, "Could not remove temp file after failed write");
            }
            Err(e)
        }
    }
}
