use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{date_range::DateRange, money::Money, supplier::SupplierId};

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
pub struct RateId(pub u32);

/// Supplier rate valid over a date range.
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
pub struct Rate {
    pub id: RateId,
    pub supplier_id: SupplierId,
    pub value: Money,
    pub period: DateRange,

    #[builder(into)]
    pub created_by_user: String,

    #[builder(default = Utc::now())]
    pub created_on: DateTime<Utc>,
}
