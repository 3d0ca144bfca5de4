use std::fmt::{Debug, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Effective end of an open-ended range when comparing it with ordinary date arithmetic.
pub const SENTINEL_FAR_FUTURE: NaiveDate = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();

/// Calendar date range with day granularity.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// Inclusive.
    pub start: NaiveDate,

    /// Inclusive, `None` means the range is ongoing.
    pub end: Option<NaiveDate>,
}

impl Debug for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}..={}", self.start, end),
            None => write!(f, "{}..", self.start),
        }
    }
}

impl DateRange {
    pub const fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Open-ended range starting on the date.
    pub const fn since(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    pub const fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub const fn is_open_ended(self) -> bool {
        self.end.is_none()
    }

    /// Whether the end, when present, does not precede the start.
    #[must_use]
    pub fn is_well_formed(self) -> bool {
        self.end.is_none_or(|end| end >= self.start)
    }

    #[must_use]
    pub fn effective_end(self) -> NaiveDate {
        self.end.unwrap_or(SENTINEL_FAR_FUTURE)
    }

    /// Days shared by both ranges.
    ///
    /// The end of the intersection is `None` only when both ranges are open-ended. When just one
    /// of them is, the intersection ends where the bounded one does, but never past
    /// [`SENTINEL_FAR_FUTURE`].
    pub fn intersection(self, other: Self) -> Option<Self> {
        let (self_end, other_end) = (self.effective_end(), other.effective_end());
        let start = self.start.max(other.start);
        let raw_end = self_end.min(other_end);

        // Single guard: the sentinel must never let a degenerate window through.
        if !((self.start <= other_end) && (other.start <= self_end) && (start <= raw_end)) {
            return None;
        }

        let end = (!(self.is_open_ended() && other.is_open_ended())).then_some(raw_end);
        Some(Self { start, end })
    }

    /// Whether both bounds lie on or before [`SENTINEL_FAR_FUTURE`].
    #[must_use]
    pub fn is_before_sentinel(self) -> bool {
        self.start <= SENTINEL_FAR_FUTURE && self.end.is_none_or(|end| end <= SENTINEL_FAR_FUTURE)
    }
}
