pub mod date_range;
pub mod money;
pub mod overlap;
pub mod rate;
pub mod scan;
pub mod supplier;

pub use self::{
    date_range::DateRange,
    money::Money,
    overlap::{OverlapDetector, OverlapGroup, OverlapPair},
    rate::{Rate, RateId},
    scan::Strategy,
    supplier::{Supplier, SupplierId},
};
