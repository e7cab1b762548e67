#![allow(dead_code)]

use keepsake_db::{
    Entity, EntityId, EntityRef, MemoryBackend, StorageBackend, StorageError, Store, StoreConfig,
};
use keepsake_storage::{JsonCodec, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub age: u32,
}

impl Entity for Person {
    const TYPE_NAME: &'static str = "Person";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pet {
    pub id: EntityId,
    pub species: String,
}

impl Entity for Pet {
    const TYPE_NAME: &'static str = "Pet";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

pub fn person(name: &str) -> EntityRef<Person> {
    EntityRef::new(Person {
        id: EntityId::UNASSIGNED,
        name: name.to_string(),
        age: 0,
    })
}

pub fn pet(species: &str) -> EntityRef<Pet> {
    EntityRef::new(Pet {
        id: EntityId::UNASSIGNED,
        species: species.to_string(),
    })
}

/// Memory backend whose replace can be switched to fail.
#[derive(Default)]
pub struct FlakyBackend {
    pub inner: MemoryBackend,
    fail_replace: AtomicBool,
}

impl FlakyBackend {
    pub fn set_failing(&self, failing: bool) {
        self.fail_replace.store(failing, Ordering::SeqCst);
    }
}

impl StorageBackend for FlakyBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.read(name)
    }
    fn write(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        self.inner.write(name, bytes)
    }
    fn exists(&self, name: &str) -> StorageResult<bool> {
        self.inner.exists(name)
    }
    fn replace(&self, from: &str, to: &str) -> StorageResult<()> {
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("disk full".into()));
        }
        self.inner.replace(from, to)
    }
    fn remove(&self, name: &str) -> StorageResult<()> {
        self.inner.remove(name)
    }
}

/// Memory backend that can park its next `write` until the test lets it go.
///
/// Once armed, the next write waits on `reached` (the writer has started)
/// and then on `release` before touching storage.
pub struct GatedBackend {
    pub inner: MemoryBackend,
    armed: AtomicBool,
    pub reached: Barrier,
    pub release: Barrier,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            armed: AtomicBool::new(false),
            reached: Barrier::new(2),
            release: Barrier::new(2),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl Default for GatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for GatedBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.read(name)
    }
    fn write(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.wait();
            self.release.wait();
        }
        self.inner.write(name, bytes)
    }
    fn exists(&self, name: &str) -> StorageResult<bool> {
        self.inner.exists(name)
    }
    fn replace(&self, from: &str, to: &str) -> StorageResult<()> {
        self.inner.replace(from, to)
    }
    fn remove(&self, name: &str) -> StorageResult<()> {
        self.inner.remove(name)
    }
}

/// A store over `backend`, with default naming.
pub fn store_on(backend: Arc<dyn StorageBackend>) -> Store {
    Store::with_backend(StoreConfig::new(""), backend, Arc::new(JsonCodec::default()))
}

/// Decodes a file written to a memory backend.
pub fn read_json(backend: &MemoryBackend, name: &str) -> serde_json::Value {
    let bytes = backend.get(name).unwrap_or_else(|| panic!("{name} was not written"));
    serde_json::from_slice(&bytes).unwrap()
}

/// Routes store logs to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
