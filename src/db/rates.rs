use std::collections::BTreeMap;

use chrono::Utc;
use itertools::Itertools;

use crate::{
    core::{DateRange, Money, Rate, RateId, SupplierId},
    db::{Db, Tables},
    prelude::*,
};

/// Caller-controlled rate fields.
#[derive(Clone, Debug)]
pub struct RateFields {
    pub supplier_id: SupplierId,
    pub value: Money,
    pub period: DateRange,
    pub created_by_user: String,
}

/// Rate along with its supplier's name.
#[derive(Clone, Debug)]
pub struct NamedRate {
    pub rate: Rate,
    pub supplier_name: String,
}

/// Rates and supplier names read under the same lock.
#[derive(Clone, Debug, Default)]
pub struct OverlapSnapshot {
    pub rates: Vec<Rate>,
    pub names: BTreeMap<SupplierId, String>,
}

/// The rate refers to a supplier that does not exist.
#[derive(Copy, Clone, Debug, derive_more::Display, derive_more::Error)]
#[display("supplier #{_0} does not exist")]
pub struct MissingSupplier(#[error(not(source))] pub SupplierId);

#[must_use]
pub struct Rates<'d>(pub &'d Db);

impl Rates<'_> {
    /// Rates ordered by supplier name and then by start date.
    pub async fn list(&self, supplier_id: Option<SupplierId>) -> Vec<NamedRate> {
        let tables = self.0.read().await;
        tables
            .rates
            .values()
            .filter(|rate| supplier_id.is_none_or(|supplier_id| rate.supplier_id == supplier_id))
            .filter_map(|rate| named(&tables, rate))
            .sorted_by(|lhs, rhs| {
                (&lhs.supplier_name, lhs.rate.period.start, lhs.rate.id).cmp(&(
                    &rhs.supplier_name,
                    rhs.rate.period.start,
                    rhs.rate.id,
                ))
            })
            .collect()
    }

    pub async fn get(&self, id: RateId) -> Option<NamedRate> {
        let tables = self.0.read().await;
        tables.rates.get(&id).and_then(|rate| named(&tables, rate))
    }

    pub async fn exists(&self, id: RateId) -> bool {
        self.0.read().await.rates.contains_key(&id)
    }

    /// Everything the overlap detector needs, optionally narrowed down to one supplier.
    pub async fn overlap_snapshot(&self, supplier_id: Option<SupplierId>) -> OverlapSnapshot {
        let tables = self.0.read().await;
        let matches = |id: SupplierId| supplier_id.is_none_or(|supplier_id| id == supplier_id);
        OverlapSnapshot {
            rates: tables.rates.values().filter(|rate| matches(rate.supplier_id)).cloned().collect(),
            names: tables
                .suppliers
                .values()
                .filter(|supplier| matches(supplier.id))
                .map(|supplier| (supplier.id, supplier.name.clone()))
                .collect(),
        }
    }

    /// Insert the rate, failing with [`MissingSupplier`] if its supplier does not exist.
    #[instrument(skip_all, fields(supplier_id = %fields.supplier_id))]
    pub async fn insert(&self, fields: RateFields) -> Result<NamedRate> {
        let named = self
            .0
            .write(|tables| {
                let supplier_name = existing_supplier_name(tables, fields.supplier_id)?;
                let rate = Rate::builder()
                    .id(tables.next_rate_id())
                    .supplier_id(fields.supplier_id)
                    .value(fields.value.rounded())
                    .period(fields.period)
                    .created_by_user(fields.created_by_user)
                    .created_on(Utc::now())
                    .build();
                tables.rates.insert(rate.id, rate.clone());
                Ok(NamedRate { rate, supplier_name })
            })
            .await?;
        info!(id = %named.rate.id, "created");
        Ok(named)
    }

    /// Replace the caller-controlled fields, returns [`None`] if the rate does not exist.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(&self, id: RateId, fields: RateFields) -> Result<Option<NamedRate>> {
        self.0
            .write(|tables| {
                if !tables.rates.contains_key(&id) {
                    return Ok(None);
                }
                let supplier_name = existing_supplier_name(tables, fields.supplier_id)?;
                let Some(rate) = tables.rates.get_mut(&id) else {
                    return Ok(None);
                };
                rate.supplier_id = fields.supplier_id;
                rate.value = fields.value.rounded();
                rate.period = fields.period;
                rate.created_by_user = fields.created_by_user;
                Ok(Some(NamedRate { rate: rate.clone(), supplier_name }))
            })
            .await
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&self, id: RateId) -> Result<bool> {
        self.0.write(|tables| Ok(tables.rates.remove(&id).is_some())).await
    }
}

fn existing_supplier_name(tables: &Tables, supplier_id: SupplierId) -> Result<String> {
    let supplier_name = tables.supplier_name(supplier_id).ok_or(MissingSupplier(supplier_id))?;
    Ok(supplier_name.to_string())
}

fn named(tables: &Tables, rate: &Rate) -> Option<NamedRate> {
    let supplier_name = tables.supplier_name(rate.supplier_id)?.to_string();
    Some(NamedRate { rate: rate.clone(), supplier_name })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::seed;

    fn fields(supplier_id: u32, value: Decimal) -> RateFields {
        RateFields {
            supplier_id: SupplierId(supplier_id),
            value: Money(value),
            period: DateRange::since(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            created_by_user: "admin.user".to_string(),
        }
    }

    #[tokio::test]
    async fn list_ordered_by_supplier_name_then_start() {
        let db = Db::in_memory(seed::tables());
        let ids = db.rates().list(None).await.into_iter().map(|named| named.rate.id.0).collect_vec();
        assert_eq!(ids, [1, 8, 2, 3, 4, 6, 10, 7, 9, 5]);
    }

    #[tokio::test]
    async fn list_filtered() {
        let db = Db::in_memory(seed::tables());
        let rates = db.rates().list(Some(SupplierId(3))).await;
        assert_eq!(rates.len(), 3);
        assert!(rates.iter().all(|named| named.supplier_name == "Premium Partners"));
        assert!(db.rates().list(Some(SupplierId(42))).await.is_empty());
    }

    #[tokio::test]
    async fn insert_rounds_value() -> Result {
        let db = Db::in_memory(seed::tables());
        let inserted = db.rates().insert(fields(2, Decimal::new(12_345, 3))).await?;
        assert_eq!(inserted.rate.id, RateId(11));
        assert_eq!(inserted.rate.value, Money(Decimal::new(1235, 2)));
        assert_eq!(inserted.supplier_name, "Quality Supplies");
        let named = db.rates().get(RateId(11)).await.context("missing rate")?;
        assert_eq!(named.rate.value, inserted.rate.value);
        assert_eq!(named.rate.created_on, inserted.rate.created_on);
        Ok(())
    }

    #[tokio::test]
    async fn insert_missing_supplier() {
        let db = Db::in_memory(seed::tables());
        let error = db.rates().insert(fields(42, Decimal::ONE)).await.unwrap_err();
        assert!(error.downcast_ref::<MissingSupplier>().is_some());
        assert!(!db.rates().exists(RateId(11)).await);
    }

    #[tokio::test]
    async fn update_ok() -> Result {
        let db = Db::in_memory(seed::tables());
        let updated = db
            .rates()
            .update(RateId(5), fields(3, Decimal::new(5, 0)))
            .await?
            .context("missing rate")?;
        assert_eq!(updated.rate.supplier_id, SupplierId(3));
        assert_eq!(updated.rate.value, Money(Decimal::new(5, 0)));
        assert_eq!(updated.supplier_name, "Premium Partners");
        assert!(db.rates().update(RateId(42), fields(3, Decimal::ONE)).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_supplier_leaves_rate_intact() {
        let db = Db::in_memory(seed::tables());
        let error = db.rates().update(RateId(5), fields(42, Decimal::ONE)).await.unwrap_err();
        assert!(error.downcast_ref::<MissingSupplier>().is_some());
        let rate = db.rates().get(RateId(5)).await.unwrap().rate;
        assert_eq!(rate.supplier_id, SupplierId(2));
    }

    #[tokio::test]
    async fn delete_ok() -> Result {
        let db = Db::in_memory(seed::tables());
        assert!(db.rates().delete(RateId(3)).await?);
        assert!(!db.rates().delete(RateId(3)).await?);
        assert_eq!(db.rates().list(None).await.len(), 9);
        Ok(())
    }

    #[tokio::test]
    async fn overlap_snapshot_filtered() {
        let db = Db::in_memory(seed::tables());
        let snapshot = db.rates().overlap_snapshot(Some(SupplierId(2))).await;
        assert_eq!(snapshot.rates.len(), 2);
        assert_eq!(snapshot.names.len(), 1);
        assert_eq!(db.rates().overlap_snapshot(None).await.rates.len(), 10);
    }
}
