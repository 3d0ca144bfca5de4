use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    core::{Rate, Supplier},
    db::Tables,
    prelude::*,
};

/// On-disk representation of the tables.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    last_supplier_id: u32,
    last_rate_id: u32,
    suppliers: Vec<Supplier>,
    rates: Vec<Rate>,
}

impl From<&Tables> for Snapshot {
    fn from(tables: &Tables) -> Self {
        Self {
            last_supplier_id: tables.last_supplier_id,
            last_rate_id: tables.last_rate_id,
            suppliers: tables.suppliers.values().cloned().collect(),
            rates: tables.rates.values().cloned().collect(),
        }
    }
}

impl From<Snapshot> for Tables {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            // Tolerate hand-edited files with stale counters:
            last_supplier_id: snapshot
                .suppliers
                .iter()
                .map(|supplier| supplier.id.0)
                .fold(snapshot.last_supplier_id, u32::max),
            last_rate_id: snapshot
                .rates
                .iter()
                .map(|rate| rate.id.0)
                .fold(snapshot.last_rate_id, u32::max),
            suppliers: snapshot.suppliers.into_iter().map(|supplier| (supplier.id, supplier)).collect(),
            rates: snapshot.rates.into_iter().map(|rate| (rate.id, rate)).collect(),
        }
    }
}

/// Read the tables, returns [`None`] when there is no snapshot yet.
pub fn load(path: &Path) -> Result<Option<Tables>> {
    if !path.is_file() {
        return Ok(None);
    }
    info!(path = %path.display(), "loading the snapshot…");
    let contents = fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let snapshot: Snapshot = serde_json::from_slice(&contents)
        .with_context(|| format!("failed to parse `{}`", path.display()))?;
    let tables = Tables::from(snapshot);
    ensure!(
        tables.rates.values().all(|rate| tables.suppliers.contains_key(&rate.supplier_id)),
        "`{}` contains rates of unknown suppliers",
        path.display(),
    );
    Ok(Some(tables))
}

/// Atomically rewrite the snapshot file.
pub fn save(tables: &Tables, path: &Path) -> Result {
    let contents = serde_json::to_vec_pretty(&Snapshot::from(tables))?;
    let temporary_path = path.with_extension("tmp");
    fs::write(&temporary_path, contents)
        .with_context(|| format!("failed to write `{}`", temporary_path.display()))?;
    fs::rename(&temporary_path, path)
        .with_context(|| format!("failed to replace `{}`", path.display()))?;
    debug!(path = %path.display(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{RateId, SupplierId},
        db::seed,
    };

    #[test]
    fn missing_file_ok() -> Result {
        let directory = tempfile::tempdir()?;
        assert!(load(&directory.path().join("missing.json"))?.is_none());
        Ok(())
    }

    #[test]
    fn round_trip_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("db.json");
        let tables = seed::tables();
        save(&tables, &path)?;
        let loaded = load(&path)?.context("the snapshot must exist")?;
        assert_eq!(loaded.suppliers.len(), 3);
        assert_eq!(loaded.rates.len(), 10);
        assert_eq!(loaded.last_supplier_id, 3);
        assert_eq!(loaded.last_rate_id, 10);
        assert_eq!(loaded.rates[&RateId(8)].period, tables.rates[&RateId(8)].period);
        assert_eq!(loaded.rates[&RateId(4)].value, tables.rates[&RateId(4)].value);
        Ok(())
    }

    #[test]
    fn stale_counters_are_raised() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("db.json");
        let mut tables = seed::tables();
        tables.last_rate_id = 0;
        tables.last_supplier_id = 1;
        save(&tables, &path)?;
        let loaded = load(&path)?.context("the snapshot must exist")?;
        assert_eq!(loaded.last_supplier_id, 3);
        assert_eq!(loaded.last_rate_id, 10);
        Ok(())
    }

    #[test]
    fn orphan_rates_rejected() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("db.json");
        let mut tables = seed::tables();
        tables.suppliers.remove(&SupplierId(2));
        save(&tables, &path)?;
        assert!(load(&path).is_err());
        Ok(())
    }
}
