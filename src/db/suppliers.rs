use chrono::Utc;
use itertools::Itertools;

use crate::{
    core::{Rate, Supplier, SupplierId},
    db::{Db, Tables},
    prelude::*,
};

/// Caller-controlled supplier fields.
#[derive(Clone, Debug)]
pub struct SupplierFields {
    pub name: String,
    pub address: Option<String>,
    pub created_by_user: String,
}

/// Supplier along with its rates ordered by start date.
#[derive(Clone, Debug)]
pub struct SupplierWithRates {
    pub supplier: Supplier,
    pub rates: Vec<Rate>,
}

#[must_use]
pub struct Suppliers<'d>(pub &'d Db);

impl Suppliers<'_> {
    /// All suppliers ordered by name.
    pub async fn list(&self) -> Vec<SupplierWithRates> {
        let tables = self.0.read().await;
        tables
            .suppliers
            .values()
            .sorted_by(|lhs, rhs| lhs.name.cmp(&rhs.name).then(lhs.id.cmp(&rhs.id)))
            .map(|supplier| with_rates(&tables, supplier))
            .collect()
    }

    pub async fn get(&self, id: SupplierId) -> Option<SupplierWithRates> {
        let tables = self.0.read().await;
        tables.suppliers.get(&id).map(|supplier| with_rates(&tables, supplier))
    }

    pub async fn exists(&self, id: SupplierId) -> bool {
        self.0.read().await.suppliers.contains_key(&id)
    }

    #[instrument(skip_all, fields(supplier_name = %fields.name))]
    pub async fn insert(&self, fields: SupplierFields) -> Result<Supplier> {
        let supplier = self
            .0
            .write(|tables| {
                let supplier = Supplier::builder()
                    .id(tables.next_supplier_id())
                    .name(fields.name)
                    .maybe_address(fields.address)
                    .created_by_user(fields.created_by_user)
                    .created_on(Utc::now())
                    .build();
                tables.suppliers.insert(supplier.id, supplier.clone());
                Ok(supplier)
            })
            .await?;
        info!(id = %supplier.id, "created");
        Ok(supplier)
    }

    /// Replace the caller-controlled fields, returns [`None`] if the supplier does not exist.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(&self, id: SupplierId, fields: SupplierFields) -> Result<Option<Supplier>> {
        self.0
            .write(|tables| {
                let Some(supplier) = tables.suppliers.get_mut(&id) else {
                    return Ok(None);
                };
                supplier.name = fields.name;
                supplier.address = fields.address;
                supplier.created_by_user = fields.created_by_user;
                Ok(Some(supplier.clone()))
            })
            .await
    }

    /// Delete the supplier together with its rates.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&self, id: SupplierId) -> Result<bool> {
        self.0
            .write(|tables| {
                if tables.suppliers.remove(&id).is_none() {
                    return Ok(false);
                }
                let n_rates = tables.rates.len();
                tables.rates.retain(|_, rate| rate.supplier_id != id);
                info!(n_rates = n_rates - tables.rates.len(), "deleted");
                Ok(true)
            })
            .await
    }
}

fn with_rates(tables: &Tables, supplier: &Supplier) -> SupplierWithRates {
    let rates = tables
        .rates
        .values()
        .filter(|rate| rate.supplier_id == supplier.id)
        .sorted_by_key(|rate| (rate.period.start, rate.id))
        .cloned()
        .collect();
    SupplierWithRates { supplier: supplier.clone(), rates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::RateId, db::seed};

    fn fields(name: &str) -> SupplierFields {
        SupplierFields {
            name: name.to_string(),
            address: None,
            created_by_user: "admin.user".to_string(),
        }
    }

    #[tokio::test]
    async fn list_ordered_by_name() {
        let db = Db::in_memory(seed::tables());
        let suppliers = db.suppliers().list().await;
        let names = suppliers.iter().map(|entry| entry.supplier.name.as_str()).collect_vec();
        assert_eq!(names, ["BestValue", "Premium Partners", "Quality Supplies"]);
    }

    #[tokio::test]
    async fn rates_ordered_by_start() -> Result {
        let db = Db::in_memory(seed::tables());
        let entry = db.suppliers().get(SupplierId(1)).await.context("missing supplier")?;
        let ids = entry.rates.iter().map(|rate| rate.id).collect_vec();
        assert_eq!(ids, [RateId(1), RateId(8), RateId(2), RateId(3), RateId(4)]);
        Ok(())
    }

    #[tokio::test]
    async fn insert_assigns_monotonic_ids() -> Result {
        let db = Db::in_memory(seed::tables());
        let first = db.suppliers().insert(fields("First")).await?;
        let second = db.suppliers().insert(fields("Second")).await?;
        assert_eq!(first.id, SupplierId(4));
        assert_eq!(second.id, SupplierId(5));
        db.suppliers().delete(second.id).await?;
        let third = db.suppliers().insert(fields("Third")).await?;
        assert_eq!(third.id, SupplierId(6));
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_created_on() -> Result {
        let db = Db::in_memory(seed::tables());
        let before = db.suppliers().get(SupplierId(2)).await.context("missing supplier")?;
        let updated = db
            .suppliers()
            .update(SupplierId(2), fields("Renamed"))
            .await?
            .context("missing supplier")?;
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.address, None);
        assert_eq!(updated.created_on, before.supplier.created_on);
        Ok(())
    }

    #[tokio::test]
    async fn update_missing() -> Result {
        let db = Db::in_memory(Tables::default());
        assert!(db.suppliers().update(SupplierId(1), fields("Missing")).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades() -> Result {
        let db = Db::in_memory(seed::tables());
        assert!(db.suppliers().delete(SupplierId(1)).await?);
        assert!(!db.suppliers().exists(SupplierId(1)).await);
        assert!(!db.rates().exists(RateId(1)).await);
        assert!(db.rates().exists(RateId(5)).await);
        assert_eq!(db.rates().list(None).await.len(), 5);
        assert!(!db.suppliers().delete(SupplierId(1)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn persisted_to_snapshot() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("db.json");
        {
            let db = Db::open(&path, seed::tables)?;
            db.suppliers().insert(fields("Persisted")).await?;
        }
        let db = Db::open(&path, Tables::default)?;
        assert!(db.suppliers().exists(SupplierId(4)).await);
        assert_eq!(db.suppliers().list().await.len(), 4);
        Ok(())
    }
}
