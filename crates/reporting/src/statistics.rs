//! Time-windowed shop statistics.
//!
//! Order counts cover `Delivered` orders bucketed by creation time; revenue
//! covers `Sold` products bucketed by sale time and sums their price.
//! Windows of 30 and 90 days bucket by ISO week (Monday start), the 182-day
//! window by calendar month.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use bloomshop_catalog::{Product, ProductStatus};
use bloomshop_core::{DomainResult, Price};
use bloomshop_sales::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsWindow {
    Month,
    ThreeMonths,
    HalfYear,
}

impl StatisticsWindow {
    /// Accepts query names (`month`, `three_month`, `half_year`) and day
    /// counts (`30`, `90`, `182`). Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "month" | "30" => Some(Self::Month),
            "three_month" | "90" => Some(Self::ThreeMonths),
            "half_year" | "182" => Some(Self::HalfYear),
            _ => None,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Self::Month => 30,
            Self::ThreeMonths => 90,
            Self::HalfYear => 182,
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            Self::Month | Self::ThreeMonths => Granularity::Week,
            Self::HalfYear => Granularity::Month,
        }
    }

    /// Whether `at` falls within the window ending at `now`.
    pub fn contains(self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        at <= now && at >= now - Duration::days(self.days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
}

impl Granularity {
    /// First day of the bucket containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        let offset = match self {
            Granularity::Week => date.weekday().num_days_from_monday(),
            Granularity::Month => date.day0(),
        };
        date - Duration::days(i64::from(offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsKind {
    OrderCount,
    Revenue,
}

impl StatisticsKind {
    /// Returned instead of a series when no window matches.
    pub fn fallback_message(self) -> &'static str {
        match self {
            StatisticsKind::OrderCount => "shop order statistics",
            StatisticsKind::Revenue => "shop revenue statistics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodValue<T> {
    pub period_start: NaiveDate,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Statistics {
    OrderCount(Vec<PeriodValue<u64>>),
    Revenue(Vec<PeriodValue<Price>>),
    /// No window was given or it matched none of the supported ones.
    Info(&'static str),
}

pub fn order_count_by_period<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    window: StatisticsWindow,
    now: DateTime<Utc>,
) -> Vec<PeriodValue<u64>> {
    let granularity = window.granularity();
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for order in orders {
        if order.status() != OrderStatus::Delivered {
            continue;
        }
        let Some(created_at) = order.created_at() else {
            continue;
        };
        if window.contains(created_at, now) {
            *buckets
                .entry(granularity.period_start(created_at.date_naive()))
                .or_default() += 1;
        }
    }

    into_series(buckets)
}

pub fn revenue_by_period<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    window: StatisticsWindow,
    now: DateTime<Utc>,
) -> DomainResult<Vec<PeriodValue<Price>>> {
    let granularity = window.granularity();
    let mut buckets: BTreeMap<NaiveDate, Price> = BTreeMap::new();

    for product in products {
        if product.status() != ProductStatus::Sold {
            continue;
        }
        let Some(sold_at) = product.sale_timestamp() else {
            continue;
        };
        if window.contains(sold_at, now) {
            let bucket = buckets
                .entry(granularity.period_start(sold_at.date_naive()))
                .or_default();
            *bucket = bucket.checked_add(product.price())?;
        }
    }

    Ok(into_series(buckets))
}

/// Statistics for a raw window parameter.
///
/// A missing or unsupported window yields [`Statistics::Info`], not an error.
pub fn statistics(
    window: Option<&str>,
    kind: StatisticsKind,
    now: DateTime<Utc>,
    orders: &[Order],
    products: &[Product],
) -> DomainResult<Statistics> {
    let Some(window) = window.and_then(StatisticsWindow::parse) else {
        return Ok(Statistics::Info(kind.fallback_message()));
    };

    Ok(match kind {
        StatisticsKind::OrderCount => {
            Statistics::OrderCount(order_count_by_period(orders, window, now))
        }
        StatisticsKind::Revenue => Statistics::Revenue(revenue_by_period(products, window, now)?),
    })
}

fn into_series<T>(buckets: BTreeMap<NaiveDate, T>) -> Vec<PeriodValue<T>> {
    buckets
        .into_iter()
        .map(|(period_start, value)| PeriodValue {
            period_start,
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloomshop_catalog::{NewProduct, ProductKind, ProductType};
    use bloomshop_core::{Aggregate, CartId, OrderId, Percent, ProductId, ProductTypeId, UserId};
    use bloomshop_sales::{ChangeStatus, DeliveryFields, OrderCommand, PlaceOrder, StatusActor};
    use chrono::{NaiveTime, TimeZone};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn bouquet() -> ProductType {
        ProductType {
            id: ProductTypeId::new(),
            title: "Bouquet".to_string(),
            kind: ProductKind::Bouquet,
            allowance: Percent::new(0),
            florist_allowance: Percent::new(10),
            courier_allowance: Percent::new(5),
        }
    }

    fn listed(price: &str, created_at: DateTime<Utc>) -> Product {
        let ty = bouquet();
        Product::list(
            NewProduct {
                id: ProductId::new(),
                name: "Roses".to_string(),
                product_type: ty.id,
                florist: UserId::new(),
                base_price: price.parse().unwrap(),
            },
            &ty,
            created_at,
        )
        .unwrap()
    }

    fn sold(price: &str, sold_at: DateTime<Utc>) -> Product {
        let mut product = listed(price, sold_at);
        product.reserve().unwrap();
        product.sell(sold_at).unwrap();
        product
    }

    fn order(created_at: DateTime<Utc>, delivered: bool) -> Order {
        let id = OrderId::new();
        let mut order = Order::empty(id);
        order
            .execute(&OrderCommand::PlaceOrder(PlaceOrder {
                order_id: id,
                cart_id: CartId::new(),
                client: None,
                delivery: DeliveryFields {
                    address: Some("Isanova 5".to_string()),
                    received_date: Some(created_at.date_naive()),
                    received_time: NaiveTime::from_hms_opt(18, 0, 0),
                    ..DeliveryFields::default()
                },
                total_price: "10".parse().unwrap(),
                occurred_at: created_at,
            }))
            .unwrap();
        if delivered {
            let courier = StatusActor::Courier(UserId::new());
            for status in [OrderStatus::InTransit, OrderStatus::Delivered] {
                order
                    .execute(&OrderCommand::ChangeStatus(ChangeStatus {
                        order_id: id,
                        status,
                        actor: courier,
                        occurred_at: created_at,
                    }))
                    .unwrap();
            }
        }
        order
    }

    #[test]
    fn parses_names_and_day_counts() {
        assert_eq!(StatisticsWindow::parse("month"), Some(StatisticsWindow::Month));
        assert_eq!(StatisticsWindow::parse("90"), Some(StatisticsWindow::ThreeMonths));
        assert_eq!(StatisticsWindow::parse(" half_year "), Some(StatisticsWindow::HalfYear));
        assert_eq!(StatisticsWindow::parse("365"), None);
    }

    #[test]
    fn weeks_start_on_monday_and_months_on_the_first() {
        // 2026-05-14 is a Thursday.
        let thursday = NaiveDate::from_ymd_opt(2026, 5, 14).unwrap();
        assert_eq!(
            Granularity::Week.period_start(thursday),
            NaiveDate::from_ymd_opt(2026, 5, 11).unwrap()
        );
        assert_eq!(
            Granularity::Month.period_start(thursday),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
        );
    }

    #[test]
    fn revenue_only_counts_sold_products_in_window() {
        let now = at(2026, 5, 31);
        let mut reserved = listed("999", at(2026, 5, 20));
        reserved.reserve().unwrap();
        let products = vec![
            sold("10.5", at(2026, 5, 25)), // Monday
            sold("20", at(2026, 5, 27)),   // same week
            sold("7", at(2026, 5, 12)),
            sold("100", at(2026, 3, 1)), // outside 30 days
            reserved,
        ];

        let series = revenue_by_period(&products, StatisticsWindow::Month, now).unwrap();
        assert_eq!(
            series,
            vec![
                PeriodValue {
                    period_start: NaiveDate::from_ymd_opt(2026, 5, 11).unwrap(),
                    value: "7".parse().unwrap(),
                },
                PeriodValue {
                    period_start: NaiveDate::from_ymd_opt(2026, 5, 25).unwrap(),
                    value: "30.5".parse().unwrap(),
                },
            ]
        );
    }

    #[test]
    fn half_year_groups_by_month() {
        let now = at(2026, 6, 30);
        let products = vec![
            sold("1", at(2026, 2, 3)),
            sold("2", at(2026, 2, 27)),
            sold("4", at(2026, 6, 1)),
        ];
        let series = revenue_by_period(&products, StatisticsWindow::HalfYear, now).unwrap();
        let periods: Vec<_> = series.iter().map(|p| p.period_start).collect();
        assert_eq!(
            periods,
            vec![
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            ]
        );
        assert_eq!(series[0].value, "3".parse().unwrap());
    }

    #[test]
    fn order_counts_only_include_delivered_orders() {
        let now = at(2026, 5, 31);
        let orders = vec![
            order(at(2026, 5, 26), true),
            order(at(2026, 5, 28), true),
            order(at(2026, 5, 28), false),
        ];
        let series = order_count_by_period(&orders, StatisticsWindow::Month, now);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 2);
    }

    #[test]
    fn missing_or_unknown_window_falls_back_to_info() {
        let now = at(2026, 5, 31);
        assert_eq!(
            statistics(None, StatisticsKind::OrderCount, now, &[], &[]).unwrap(),
            Statistics::Info("shop order statistics")
        );
        assert_eq!(
            statistics(Some("week"), StatisticsKind::Revenue, now, &[], &[]).unwrap(),
            Statistics::Info("shop revenue statistics")
        );
        assert_eq!(
            statistics(Some("30"), StatisticsKind::Revenue, now, &[], &[]).unwrap(),
            Statistics::Revenue(Vec::new())
        );
    }

    proptest! {
        #[test]
        fn period_start_is_a_monday_not_after_the_date(days in 0i64..3650) {
            let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(days);
            let start = Granularity::Week.period_start(date);
            prop_assert_eq!(start.weekday(), chrono::Weekday::Mon);
            prop_assert!(start <= date);
            prop_assert!(date - start < Duration::days(7));
        }
    }
}
