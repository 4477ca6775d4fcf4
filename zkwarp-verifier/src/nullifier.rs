// zkwarp/zkwarp-verifier/src/nullifier.rs

use std::{collections::HashSet, path::Path, sync::Mutex};

use zkwarp_common::ZkwarpError;

pub type Nullifier = [u8; 32];

/// Append-only registry of spent nullifiers.
///
/// `insert_if_absent` is the single atomic primitive: of any set of
/// concurrent calls for the same nullifier, exactly one returns true.
/// Verification must never split the check and the insert into separate
/// store operations.
pub trait NullifierStore: Send + Sync {
    fn contains(&self, nullifier: &Nullifier) -> Result<bool, ZkwarpError>;
    /// Returns true if the nullifier was newly recorded, false if it was
    /// already present.
    fn insert_if_absent(&self, nullifier: &Nullifier) -> Result<bool, ZkwarpError>;
}

/// Process-local store for tests and single-node deployments.
#[derive(Default)]
pub struct MemoryNullifierStore {
    spent: Mutex<HashSet<Nullifier>>,
}

impl MemoryNullifierStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NullifierStore for MemoryNullifierStore {
    fn contains(&self, nullifier: &Nullifier) -> Result<bool, ZkwarpError> {
        Ok(self.lock()?.contains(nullifier))
    }

    fn insert_if_absent(&self, nullifier: &Nullifier) -> Result<bool, ZkwarpError> {
        Ok(self.lock()?.insert(*nullifier))
    }
}

impl MemoryNullifierStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashSet<Nullifier>>, ZkwarpError> {
        self.spent
            .lock()
            .map_err(|_| ZkwarpError::ResourceUnavailable("nullifier store mutex poisoned".into()))
    }
}

/// Durable store backed by sled. Atomicity comes from sled's
/// compare-and-swap on the absent key.
pub struct SledNullifierStore {
    db: sled::Db,
}

impl SledNullifierStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ZkwarpError> {
        let db = sled::open(path).map_err(store_err)?;
        Ok(Self { db })
    }

    /// In-memory sled instance, dropped with the store. Test use only.
    pub fn temporary() -> Result<Self, ZkwarpError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(store_err)?;
        Ok(Self { db })
    }
}

impl NullifierStore for SledNullifierStore {
    fn contains(&self, nullifier: &Nullifier) -> Result<bool, ZkwarpError> {
        self.db.contains_key(nullifier).map_err(store_err)
    }

    fn insert_if_absent(&self, nullifier: &Nullifier) -> Result<bool, ZkwarpError> {
        let swap = self
            .db
            .compare_and_swap(nullifier, None as Option<&[u8]>, Some(&[1u8][..]))
            .map_err(store_err)?;
        Ok(swap.is_ok())
    }
}

fn store_err(err: sled::Error) -> ZkwarpError {
    ZkwarpError::ResourceUnavailable(format!("nullifier store error: {err}"))
}
