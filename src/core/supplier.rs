use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct SupplierId(pub u32);

/// Owner of rate records.
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
pub struct Supplier {
    pub id: SupplierId,

    #[builder(into)]
    pub name: String,

    #[builder(into)]
    pub address: Option<String>,

    #[builder(into)]
    pub created_by_user: String,

    #[builder(default = Utc::now())]
    pub created_on: DateTime<Utc>,
}
