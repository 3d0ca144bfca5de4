//! Demo data set with a few deliberately overlapping rates.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::{
    core::{DateRange, Money, Rate, RateId, Supplier, SupplierId},
    db::Tables,
};

const CREATED_BY_USER: &str = "admin.user";

const SUPPLIERS: [(u32, &str, &str); 3] = [
    (1, "BestValue", "1, Main Street, The District, City1, XXX-AADA"),
    (2, "Quality Supplies", "2, Industrial Ave, Business Park, City2, YYY-BBBB"),
    (3, "Premium Partners", "3, Commerce St, Trade Center, City3, ZZZ-CCCC"),
];

/// `(id, supplier ID, rate, period)`.
const RATES: [(u32, u32, i64, DateRange); 10] = [
    (1, 1, 10, DateRange::since(ymd(2015, 1, 1)).with_end(ymd(2015, 3, 31))),
    (2, 1, 20, DateRange::since(ymd(2015, 4, 1)).with_end(ymd(2015, 5, 1))),
    (3, 1, 10, DateRange::since(ymd(2015, 5, 30)).with_end(ymd(2015, 7, 25))),
    (4, 1, 25, DateRange::since(ymd(2015, 10, 1))),
    (5, 2, 100, DateRange::since(ymd(2016, 11, 1))),
    (6, 3, 30, DateRange::since(ymd(2016, 12, 1)).with_end(ymd(2017, 1, 1))),
    (7, 3, 30, DateRange::since(ymd(2017, 1, 2))),
    (8, 1, 15, DateRange::since(ymd(2015, 2, 15)).with_end(ymd(2015, 4, 15))),
    (9, 2, 90, DateRange::since(ymd(2016, 10, 15)).with_end(ymd(2017, 2, 1))),
    (10, 3, 25, DateRange::since(ymd(2016, 12, 15)).with_end(ymd(2017, 1, 15))),
];

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

const CREATED_ON: NaiveDate = ymd(2021, 7, 30);

fn created_on() -> DateTime<Utc> {
    CREATED_ON.and_time(NaiveTime::MIN).and_utc()
}

#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn tables() -> Tables {
    let suppliers = SUPPLIERS
        .into_iter()
        .map(|(id, name, address)| {
            let supplier = Supplier::builder()
                .id(SupplierId(id))
                .name(name)
                .address(address.to_string())
                .created_by_user(CREATED_BY_USER)
                .created_on(created_on())
                .build();
            (supplier.id, supplier)
        })
        .collect();
    let rates = RATES
        .into_iter()
        .map(|(id, supplier_id, value, period)| {
            let rate = Rate::builder()
                .id(RateId(id))
                .supplier_id(SupplierId(supplier_id))
                .value(Money(Decimal::from(value)))
                .period(period)
                .created_by_user(CREATED_BY_USER)
                .created_on(created_on())
                .build();
            (rate.id, rate)
        })
        .collect();
    Tables {
        suppliers,
        rates,
        last_supplier_id: SUPPLIERS.len() as u32,
        last_rate_id: RATES.len() as u32,
    }
}
