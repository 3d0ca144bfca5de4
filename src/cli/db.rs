use std::path::PathBuf;

use clap::Parser;

use crate::{
    db::{Db, Tables, seed},
    prelude::*,
};

#[derive(Parser)]
pub struct DbArgs {
    /// JSON snapshot file, the store is volatile when omitted.
    #[clap(long = "db-path", env = "DB_PATH")]
    path: Option<PathBuf>,

    /// Populate a fresh store with the demo data set.
    #[clap(long = "seed", env = "DB_SEED")]
    seed: bool,
}

impl DbArgs {
    pub fn open(&self) -> Result<Db> {
        let fallback = || if self.seed { seed::tables() } else { Tables::default() };
        match &self.path {
            Some(path) => Db::open(path, fallback),
            None => {
                warn!("no snapshot path configured, changes will be lost on exit");
                Ok(Db::in_memory(fallback()))
            }
        }
    }

    /// Open the store for reading, an absent snapshot file is an error.
    pub fn open_existing(&self) -> Result<Db> {
        match &self.path {
            Some(path) => Db::load(path),
            None if self.seed => Ok(Db::in_memory(seed::tables())),
            None => bail!("either `--db-path` or `--seed` is required"),
        }
    }
}
