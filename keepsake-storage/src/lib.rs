//! File storage layer for keepsake.
//!
//! Provides the byte-level collaborators the store is built on:
//!
//! - [`Codec`] turns a type's whole record sequence into bytes and back.
//!   [`JsonCodec`] writes human-readable JSON arrays.
//! - [`StorageBackend`] reads, writes, renames and removes named files in a
//!   single root. [`FsBackend`] targets a directory on disk,
//!   [`MemoryBackend`] keeps files in a map (tests, scratch stores).
//! - [`write_durable`] implements the replace protocol: bytes go to
//!   `"{name}.tmp"` first and are then renamed over `name`, so readers never
//!   observe a half-written file.

mod backend;
mod codec;
mod durable;
mod error;

pub use backend::{FsBackend, MemoryBackend, StorageBackend};
pub use codec::{Codec, JsonCodec};
pub use durable::{temp_name, write_durable, TEMP_SUFFIX};
pub use error::{StorageError, StorageResult};
