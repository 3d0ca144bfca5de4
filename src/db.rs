use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{
    sync::{RwLock, RwLockReadGuard},
    task::spawn_blocking,
};

use crate::{
    core::{Rate, RateId, Supplier, SupplierId},
    db::{rates::Rates, suppliers::Suppliers},
    prelude::*,
};

pub mod rates;
pub mod seed;
pub mod snapshot;
pub mod suppliers;

/// Record store shared between the request handlers.
///
/// Every mutation is applied to a copy of the tables, persisted, and only then published, so a
/// failed write leaves both the memory and the snapshot file untouched.
#[must_use]
#[derive(Clone)]
pub struct Db(Arc<Inner>);

struct Inner {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

#[derive(Clone, Default)]
pub struct Tables {
    pub suppliers: BTreeMap<SupplierId, Supplier>,
    pub rates: BTreeMap<RateId, Rate>,

    /// Last issued IDs, identifiers are never reused.
    pub last_supplier_id: u32,
    pub last_rate_id: u32,
}

impl Tables {
    pub const fn next_supplier_id(&mut self) -> SupplierId {
        self.last_supplier_id += 1;
        SupplierId(self.last_supplier_id)
    }

    pub const fn next_rate_id(&mut self) -> RateId {
        self.last_rate_id += 1;
        RateId(self.last_rate_id)
    }

    pub fn supplier_name(&self, supplier_id: SupplierId) -> Option<&str> {
        self.suppliers.get(&supplier_id).map(|supplier| supplier.name.as_str())
    }
}

impl Db {
    /// Volatile store, nothing is written to disk.
    pub fn in_memory(tables: Tables) -> Self {
        Self(Arc::new(Inner { tables: RwLock::new(tables), snapshot_path: None }))
    }

    /// Open the store backed by the snapshot file.
    ///
    /// When the file does not exist yet, the store starts with the fallback tables and writes
    /// them out immediately.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, fallback: impl FnOnce() -> Tables) -> Result<Self> {
        let tables = if let Some(tables) = snapshot::load(path)? {
            tables
        } else {
            info!("no snapshot yet, starting afresh…");
            let tables = fallback();
            snapshot::save(&tables, path)?;
            tables
        };
        info!(n_suppliers = tables.suppliers.len(), n_rates = tables.rates.len(), "opened");
        Ok(Self(Arc::new(Inner { tables: RwLock::new(tables), snapshot_path: Some(path.into()) })))
    }

    /// Load the existing snapshot file into a volatile store, the file is never written.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let tables = snapshot::load(path)?
            .with_context(|| format!("snapshot `{}` does not exist", path.display()))?;
        info!(n_suppliers = tables.suppliers.len(), n_rates = tables.rates.len(), "loaded");
        Ok(Self::in_memory(tables))
    }

    pub const fn suppliers(&self) -> Suppliers<'_> {
        Suppliers(self)
    }

    pub const fn rates(&self) -> Rates<'_> {
        Rates(self)
    }

    async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.0.tables.read().await
    }

    /// Apply the mutation as a single transaction.
    ///
    /// Readers keep seeing the old tables until the snapshot is written.
    async fn write<T>(&self, mutate: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut tables = self.0.tables.write().await;
        let mut draft = tables.clone();
        let output = mutate(&mut draft)?;
        let draft = match self.0.snapshot_path.clone() {
            Some(path) => spawn_blocking(move || snapshot::save(&draft, &path).map(|()| draft))
                .await
                .context("the snapshot writer has panicked")?
                .context("failed to persist the changes")?,
            None => draft,
        };
        *tables = draft;
        Ok(output)
    }
}
