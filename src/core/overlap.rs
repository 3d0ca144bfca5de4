use std::collections::BTreeMap;

use bon::Builder;
use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    core::{rate::Rate, scan::Strategy, supplier::SupplierId},
    prelude::*,
};

/// Resolves supplier display names for the overlap groups.
pub trait OwnerNames {
    fn name_of(&self, supplier_id: SupplierId) -> Option<&str>;
}

impl OwnerNames for BTreeMap<SupplierId, String> {
    fn name_of(&self, supplier_id: SupplierId) -> Option<&str> {
        self.get(&supplier_id).map(String::as_str)
    }
}

/// Two rates of the same supplier sharing at least one day.
#[derive(Clone, Debug)]
pub struct OverlapPair {
    /// The rate earlier in the `(start, id)` order.
    pub first: Rate,

    pub second: Rate,

    /// Inclusive.
    pub start: NaiveDate,

    /// Inclusive. When both rates are open-ended, this is the processing date.
    pub end: NaiveDate,

    /// Inclusive day count of the shared window.
    pub n_days: i64,
}

/// All overlapping pairs of a single supplier.
#[derive(Clone, Debug)]
pub struct OverlapGroup {
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub pairs: Vec<OverlapPair>,
}

#[derive(Builder)]
pub struct OverlapDetector {
    /// Processing date, reported as the end of windows shared by two open-ended rates.
    today: NaiveDate,

    #[builder(default)]
    strategy: Strategy,
}

impl OverlapDetector {
    pub const UNKNOWN_SUPPLIER_NAME: &'static str = "Unknown";

    /// Find all overlapping rate pairs, grouped by supplier.
    ///
    /// Groups are ordered by supplier ID. Pairs within a group are ordered by the start dates of
    /// the first and then the second rate. Suppliers without overlaps are omitted.
    #[instrument(skip_all, fields(n_rates = rates.len(), ?supplier_id, strategy = ?self.strategy))]
    pub fn detect<N: OwnerNames + ?Sized>(
        &self,
        rates: &[Rate],
        supplier_id: Option<SupplierId>,
        names: &N,
    ) -> Vec<OverlapGroup> {
        let partitions = rates
            .iter()
            .filter(|rate| supplier_id.is_none_or(|supplier_id| rate.supplier_id == supplier_id))
            .filter(|rate| {
                let is_well_formed = rate.period.is_well_formed();
                if !is_well_formed {
                    warn!(id = %rate.id, period = ?rate.period, "skipping the malformed rate");
                }
                is_well_formed
            })
            .into_group_map_by(|rate| rate.supplier_id);

        let groups = partitions
            .into_iter()
            .sorted_unstable_by_key(|(supplier_id, _)| *supplier_id)
            .filter_map(|(supplier_id, partition)| {
                let pairs = self.detect_partition(partition);
                if pairs.is_empty() {
                    return None;
                }
                let supplier_name = names
                    .name_of(supplier_id)
                    .unwrap_or(Self::UNKNOWN_SUPPLIER_NAME)
                    .to_string();
                Some(OverlapGroup { supplier_id, supplier_name, pairs })
            })
            .collect_vec();

        debug!(n_groups = groups.len(), "detected");
        groups
    }

    fn detect_partition(&self, mut partition: Vec<&Rate>) -> Vec<OverlapPair> {
        partition.sort_unstable_by_key(|rate| (rate.period.start, rate.id));
        self.strategy
            .scan(&partition)
            .into_iter()
            .filter_map(|(i, j)| self.pair(partition[i], partition[j]))
            .sorted_unstable_by_key(|pair| {
                (pair.first.period.start, pair.second.period.start, pair.first.id, pair.second.id)
            })
            .collect()
    }

    fn pair(&self, first: &Rate, second: &Rate) -> Option<OverlapPair> {
        let window = first.period.intersection(second.period)?;
        // An ongoing overlap is reported as of today, but never before it starts:
        let end = window.end.unwrap_or_else(|| self.today.max(window.start));
        Some(OverlapPair {
            first: first.clone(),
            second: second.clone(),
            start: window.start,
            end,
            n_days: (end - window.start).num_days() + 1,
        })
    }
}
