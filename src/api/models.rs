use axum::{Json, extract::rejection::JsonRejection};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    api::error::ApiError,
    core::{DateRange, Money, OverlapGroup, OverlapPair, Rate, RateId, SupplierId},
    db::{
        rates::{NamedRate, RateFields},
        suppliers::{SupplierFields, SupplierWithRates},
    },
    validation::{Validate, Violations},
};

/// Unwrap the JSON body and check it.
pub fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    payload.validate()?;
    Ok(payload)
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[skip_serializing_none]
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: Option<TokenDto>,
}

#[derive(Serialize)]
pub struct TokenDto {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DemoCredentials {
    pub message: &'static str,
    pub users: Vec<DemoUser>,
}

#[derive(Serialize)]
pub struct DemoUser {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDto {
    pub supplier_rate_id: RateId,
    pub supplier_id: SupplierId,
    pub rate: Money,
    pub rate_start_date: NaiveDate,
    pub rate_end_date: Option<NaiveDate>,
    pub created_on: DateTime<Utc>,
    pub created_by_user: String,
    pub supplier_name: Option<String>,
}

impl RateDto {
    pub fn new(rate: Rate, supplier_name: Option<String>) -> Self {
        Self {
            supplier_rate_id: rate.id,
            supplier_id: rate.supplier_id,
            rate: rate.value,
            rate_start_date: rate.period.start,
            rate_end_date: rate.period.end,
            created_on: rate.created_on,
            created_by_user: rate.created_by_user,
            supplier_name,
        }
    }
}

impl From<NamedRate> for RateDto {
    fn from(named: NamedRate) -> Self {
        Self::new(named.rate, Some(named.supplier_name))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    pub supplier_id: SupplierId,
    pub name: String,
    pub address: Option<String>,
    pub created_on: DateTime<Utc>,
    pub created_by_user: String,
    pub rates: Vec<RateDto>,
}

impl From<SupplierWithRates> for SupplierDto {
    fn from(SupplierWithRates { supplier, rates }: SupplierWithRates) -> Self {
        let rates = rates
            .into_iter()
            .map(|rate| RateDto::new(rate, Some(supplier.name.clone())))
            .collect();
        Self {
            supplier_id: supplier.id,
            name: supplier.name,
            address: supplier.address,
            created_on: supplier.created_on,
            created_by_user: supplier.created_by_user,
            rates,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapGroupDto {
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub overlapping_rates: Vec<OverlapPairDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapPairDto {
    pub rate1: RateDto,
    pub rate2: RateDto,
    pub overlap_start_date: NaiveDate,
    pub overlap_end_date: NaiveDate,
    pub overlap_days: i64,
}

impl From<OverlapGroup> for OverlapGroupDto {
    fn from(group: OverlapGroup) -> Self {
        let supplier_name = group.supplier_name;
        let overlapping_rates = group
            .pairs
            .into_iter()
            .map(|OverlapPair { first, second, start, end, n_days }| OverlapPairDto {
                rate1: RateDto::new(first, Some(supplier_name.clone())),
                rate2: RateDto::new(second, Some(supplier_name.clone())),
                overlap_start_date: start,
                overlap_end_date: end,
                overlap_days: n_days,
            })
            .collect();
        Self { supplier_id: group.supplier_id, supplier_name, overlapping_rates }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierRequest {
    pub name: String,
    pub address: Option<String>,
    pub created_by_user: String,
}

impl Validate for SupplierRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::default();
        violations
            .check_supplier_name("name", &self.name)
            .check_address("address", self.address.as_deref())
            .check_user_name("createdByUser", &self.created_by_user);
        violations.into_result()
    }
}

impl From<SupplierRequest> for SupplierFields {
    fn from(request: SupplierRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            address: request.address.filter(|address| !address.trim().is_empty()),
            created_by_user: request.created_by_user,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub supplier_id: SupplierId,
    pub rate: Money,
    pub rate_start_date: NaiveDate,

    #[serde(default)]
    pub rate_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub created_by_user: String,
}

impl Validate for RateRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::default();
        violations
            .check_rate("rate", self.rate)
            .check_period("rateEndDate", self.rate_start_date, self.rate_end_date)
            .check_required_text("createdByUser", "Created By User", &self.created_by_user);
        violations.into_result()
    }
}

impl From<RateRequest> for RateFields {
    fn from(request: RateRequest) -> Self {
        Self {
            supplier_id: request.supplier_id,
            value: request.rate,
            period: DateRange::new(request.rate_start_date, request.rate_end_date),
            created_by_user: request.created_by_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{core::OverlapDetector, db::seed};

    #[test]
    fn supplier_request_validation() -> crate::prelude::Result {
        let request: SupplierRequest = serde_json::from_str(
            r#"{"name": "Acme & Sons", "address": "1, Main Street", "createdByUser": "jane.doe"}"#,
        )?;
        assert!(request.validate().is_ok());

        let request: SupplierRequest = serde_json::from_str(r#"{"address": "<b>"}"#)?;
        let Err(violations) = request.validate() else {
            panic!("the request must be invalid");
        };
        assert_eq!(violations.fields(), ["name", "address", "createdByUser"]);
        Ok(())
    }

    #[test]
    fn rate_request_validation() -> crate::prelude::Result {
        let request: RateRequest = serde_json::from_str(
            r#"{"supplierId": 1, "rate": 0, "rateStartDate": "2020-02-01", "rateEndDate": "2020-01-01"}"#,
        )?;
        let Err(violations) = request.validate() else {
            panic!("the request must be invalid");
        };
        assert_eq!(violations.fields(), ["rate", "rateEndDate", "createdByUser"]);
        Ok(())
    }

    #[test]
    fn rate_request_into_fields() -> crate::prelude::Result {
        let request: RateRequest = serde_json::from_str(
            r#"{"supplierId": 2, "rate": "12.50", "rateStartDate": "2020-02-01", "createdByUser": "jane.doe"}"#,
        )?;
        assert!(request.validate().is_ok());
        let fields = RateFields::from(request);
        assert_eq!(fields.supplier_id, SupplierId(2));
        assert_eq!(fields.value, Money(Decimal::new(1250, 2)));
        assert!(fields.period.is_open_ended());
        Ok(())
    }

    #[test]
    fn overlap_group_shape() -> crate::prelude::Result {
        let tables = seed::tables();
        let rates = tables.rates.values().cloned().collect::<Vec<_>>();
        let names = tables
            .suppliers
            .values()
            .map(|supplier| (supplier.id, supplier.name.clone()))
            .collect::<std::collections::BTreeMap<_, _>>();
        let groups = OverlapDetector::builder()
            .today(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .build()
            .detect(&rates, Some(SupplierId(2)), &names);
        let dto = OverlapGroupDto::from(groups.into_iter().next().unwrap());
        let value = serde_json::to_value(&dto)?;
        assert_eq!(value["supplierId"], 2);
        assert_eq!(value["supplierName"], "Quality Supplies");
        let pair = &value["overlappingRates"][0];
        assert_eq!(pair["rate1"]["supplierRateId"], 9);
        assert_eq!(pair["rate2"]["supplierRateId"], 5);
        assert_eq!(pair["rate2"]["rateEndDate"], serde_json::Value::Null);
        assert_eq!(pair["overlapStartDate"], "2016-11-01");
        assert_eq!(pair["overlapEndDate"], "2017-02-01");
        assert_eq!(pair["overlapDays"], 93);
        Ok(())
    }
}
