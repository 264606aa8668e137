//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use zonegov_store::StoreError;

use crate::governance::LmdbGovernanceStore;
use crate::LmdbError;

/// Default LMDB map size: 256 MiB, far beyond what governance state needs.
const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) members_db: Database<Bytes, Bytes>,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path with the
    /// default map size.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    /// Open or create an LMDB environment with an explicit map size.
    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)
            .map_err(|e| StoreError::Backend(format!("create data dir: {e}")))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .max_dbs(8)
                .map_size(map_size)
                .open(path)
        }
        .map_err(LmdbError::from)?;

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let members_db = env
            .create_database(&mut wtxn, Some("members"))
            .map_err(LmdbError::from)?;
        let proposals_db = env
            .create_database(&mut wtxn, Some("proposals"))
            .map_err(LmdbError::from)?;
        let votes_db = env
            .create_database(&mut wtxn, Some("votes"))
            .map_err(LmdbError::from)?;
        let meta_db = env
            .create_database(&mut wtxn, Some("meta"))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(Self {
            env: Arc::new(env),
            members_db,
            proposals_db,
            votes_db,
            meta_db,
        })
    }

    /// The governance store backed by this environment.
    pub fn governance_store(&self) -> LmdbGovernanceStore {
        LmdbGovernanceStore {
            env: self.env.clone(),
            members_db: self.members_db,
            proposals_db: self.proposals_db,
            votes_db: self.votes_db,
            meta_db: self.meta_db,
        }
    }
}
