use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::{
    cli::db::DbArgs,
    core::{OverlapDetector, Strategy, SupplierId},
    prelude::*,
    tables::build_overlaps_table,
};

#[derive(Parser)]
pub struct OverlapsArgs {
    /// Only report this supplier.
    #[clap(long = "supplier-id")]
    supplier_id: Option<SupplierId>,

    /// Reported end of overlaps between two open-ended rates, defaults to today.
    #[clap(long = "today")]
    today: Option<NaiveDate>,

    #[clap(long = "strategy", env = "OVERLAP_STRATEGY", value_enum, default_value_t)]
    strategy: Strategy,

    #[clap(flatten)]
    db: DbArgs,
}

impl OverlapsArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let db = self.db.open_existing()?;
        if let Some(supplier_id) = self.supplier_id {
            ensure!(db.suppliers().exists(supplier_id).await, "supplier #{supplier_id} not found");
        }
        let snapshot = db.rates().overlap_snapshot(self.supplier_id).await;
        let groups = OverlapDetector::builder()
            .today(self.today.unwrap_or_else(|| Local::now().date_naive()))
            .strategy(self.strategy)
            .build()
            .detect(&snapshot.rates, self.supplier_id, &snapshot.names);
        info!(n_groups = groups.len(), "detected");
        println!("{}", build_overlaps_table(&groups));
        Ok(())
    }
}
