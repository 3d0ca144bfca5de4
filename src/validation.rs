use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{DateRange, Money, date_range::SENTINEL_FAR_FUTURE};

pub const MAX_TEXT_LENGTH: usize = 450;

/// Allowed supplier IDs in queries, rejecting absurd values before they hit the store.
pub const SUPPLIER_ID_RANGE: std::ops::RangeInclusive<i64> = 1..=10_000_000;

static SUPPLIER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s.&-]+$").expect("valid regex"));

static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s.,#/-]+$").expect("valid regex"));

static USER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+\.[a-zA-Z]+$").expect("valid regex"));

/// Payload that checks itself before reaching the store.
pub trait Validate {
    fn validate(&self) -> Result<(), Violations>;
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field errors of a single payload.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, derive_more::IntoIterator)]
#[serde(transparent)]
pub struct Violations(#[into_iterator(owned, ref)] Vec<FieldError>);

impl Violations {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) -> &mut Self {
        self.0.push(FieldError { field, message: message.into() });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|error| error.field).collect()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn check_required_text(
        &mut self,
        field: &'static str,
        label: &str,
        value: &str,
    ) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, format!("{label} is required"));
        } else {
            self.check_length(field, label, value);
        }
        self
    }

    pub fn check_length(&mut self, field: &'static str, label: &str, value: &str) -> &mut Self {
        if value.chars().count() > MAX_TEXT_LENGTH {
            self.add(field, format!("{label} cannot exceed {MAX_TEXT_LENGTH} characters"));
        }
        self
    }

    pub fn check_supplier_name(&mut self, field: &'static str, value: &str) -> &mut Self {
        self.check_required_text(field, "Name", value);
        if !value.trim().is_empty() && !SUPPLIER_NAME.is_match(value) {
            self.add(field, "Name contains invalid characters");
        }
        self
    }

    pub fn check_address(&mut self, field: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.check_length(field, "Address", value);
            if !ADDRESS.is_match(value) {
                self.add(field, "Address contains invalid characters");
            }
        }
        self
    }

    /// Check the `firstname.lastname` user name.
    pub fn check_user_name(&mut self, field: &'static str, value: &str) -> &mut Self {
        self.check_required_text(field, "Created By User", value);
        if !value.trim().is_empty() && !USER_NAME.is_match(value) {
            self.add(field, "Format must be firstname.lastname");
        }
        self
    }

    pub fn check_rate(&mut self, field: &'static str, value: Money) -> &mut Self {
        if value.0 < Decimal::new(1, Money::SCALE) {
            self.add(field, "Rate must be greater than 0");
        }
        self
    }

    pub fn check_period(
        &mut self,
        field: &'static str,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> &mut Self {
        if end.is_some_and(|end| end < start) {
            self.add(field, "End date must be on or after the start date");
        }
        if !DateRange::new(start, end).is_before_sentinel() {
            self.add(field, format!("Dates cannot be later than {SENTINEL_FAR_FUTURE}"));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_name_ok() {
        let mut violations = Violations::default();
        violations.check_supplier_name("name", "Quality Supplies & Co. - North");
        assert!(violations.is_empty());
    }

    #[test]
    fn supplier_name_invalid_characters() {
        let mut violations = Violations::default();
        violations.check_supplier_name("name", "<script>");
        assert_eq!(violations.fields(), ["name"]);
    }

    #[test]
    fn supplier_name_required() {
        let mut violations = Violations::default();
        violations.check_supplier_name("name", "   ");
        assert_eq!(violations.clone().into_iter().next().unwrap().message, "Name is required");
        assert_eq!(violations.fields(), ["name"]);
    }

    #[test]
    fn too_long_text() {
        let mut violations = Violations::default();
        violations.check_supplier_name("name", &"a".repeat(MAX_TEXT_LENGTH + 1));
        assert_eq!(violations.fields(), ["name"]);
    }

    #[test]
    fn address_ok() {
        let mut violations = Violations::default();
        violations
            .check_address("address", Some("1, Main Street, The District, City1, XXX-AADA"))
            .check_address("address", Some("Unit #4/5"))
            .check_address("address", None)
            .check_address("address", Some(""));
        assert!(violations.is_empty());
    }

    #[test]
    fn address_invalid_characters() {
        let mut violations = Violations::default();
        violations.check_address("address", Some("Main Street; DROP TABLE"));
        assert_eq!(violations.fields(), ["address"]);
    }

    #[test]
    fn user_name_format() {
        let mut violations = Violations::default();
        violations.check_user_name("createdByUser", "admin.user");
        assert!(violations.is_empty());
        violations.check_user_name("createdByUser", "admin");
        violations.check_user_name("createdByUser", "admin.user2");
        assert_eq!(violations.fields(), ["createdByUser", "createdByUser"]);
    }

    #[test]
    fn rate_must_be_positive() {
        let mut violations = Violations::default();
        violations.check_rate("rate", Money(Decimal::new(1, 2)));
        assert!(violations.is_empty());
        violations.check_rate("rate", Money::default());
        violations.check_rate("rate", Money(Decimal::new(-10, 0)));
        assert_eq!(violations.fields(), ["rate", "rate"]);
    }

    #[test]
    fn period_end_not_before_start() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let mut violations = Violations::default();
        violations
            .check_period("rateEndDate", start, None)
            .check_period("rateEndDate", start, Some(start));
        assert!(violations.is_empty());
        violations.check_period("rateEndDate", start, start.pred_opt());
        assert_eq!(violations.fields(), ["rateEndDate"]);
    }

    #[test]
    fn period_not_past_far_future() {
        let start = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        let mut violations = Violations::default();
        violations.check_period("rateEndDate", start, Some(SENTINEL_FAR_FUTURE));
        assert!(violations.is_empty());
        violations
            .check_period("rateEndDate", start, SENTINEL_FAR_FUTURE.succ_opt())
            .check_period("rateStartDate", SENTINEL_FAR_FUTURE.succ_opt().unwrap(), None);
        assert_eq!(violations.fields(), ["rateEndDate", "rateStartDate"]);
    }

    #[test]
    fn into_result_ok() {
        assert!(Violations::default().into_result().is_ok());
        let mut violations = Violations::default();
        violations.add("field", "message");
        assert!(violations.into_result().is_err());
    }
}
