//! Pricing calculator.
//!
//! Pure functions: callers pass validated, non-negative prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bloomshop_core::{DomainResult, Money, Percent, Price};

use crate::product::ProductType;

/// Sale price of a product built from `base` (price without allowance).
///
/// The allowance-bearing kind gets the shop, florist and courier markups
/// added; every other kind sells at its base.
pub fn product_price(base: Price, product_type: &ProductType) -> DomainResult<Price> {
    if !product_type.bears_allowance() {
        return Ok(base);
    }
    let markup = product_type.total_allowance().of(base.amount());
    Price::new(base.amount() + markup)
}

/// Florist's share of a sold product.
pub fn florist_commission(base: Price, florist_allowance: Percent) -> DomainResult<Money> {
    Money::new(florist_allowance.of(base.amount()))
}

/// One delivered product as seen by the courier commission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionLine {
    pub base_price: Price,
    pub courier_allowance: Percent,
}

/// How a courier's cut of an order is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourierCommissionPolicy {
    /// Σ base × courier_allowance / 100 over every line.
    #[default]
    PerLineItem,
    /// Σ base × (courier_allowance of the first line) / 100.
    ///
    /// Reproduces the historical computation, which applied a single rate to
    /// the summed base prices. Only differs from `PerLineItem` when an order
    /// mixes product types with different courier allowances.
    LegacyFirstRate,
}

/// Courier commission for the products of one order.
///
/// Returns zero for an order without lines.
pub fn courier_commission(
    lines: &[CommissionLine],
    policy: CourierCommissionPolicy,
) -> DomainResult<Money> {
    let raw = match policy {
        CourierCommissionPolicy::PerLineItem => lines
            .iter()
            .map(|l| l.courier_allowance.of(l.base_price.amount()))
            .sum::<Decimal>(),
        CourierCommissionPolicy::LegacyFirstRate => match lines.first() {
            None => Decimal::ZERO,
            Some(first) => {
                let base: Decimal = lines.iter().map(|l| l.base_price.amount()).sum();
                first.courier_allowance.of(base)
            }
        },
    };
    Money::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductKind;
    use bloomshop_core::ProductTypeId;
    use proptest::prelude::*;

    fn potted(allowance: u32, florist: u32, courier: u32) -> ProductType {
        ProductType {
            id: ProductTypeId::new(),
            title: "Potted".to_string(),
            kind: ProductKind::Potted,
            allowance: Percent::new(allowance),
            florist_allowance: Percent::new(florist),
            courier_allowance: Percent::new(courier),
        }
    }

    fn line(base: i64, courier: u32) -> CommissionLine {
        CommissionLine {
            base_price: Price::from_int(base).unwrap(),
            courier_allowance: Percent::new(courier),
        }
    }

    #[test]
    fn allowance_bearing_price_adds_all_markups() {
        let price = product_price(Price::from_int(100).unwrap(), &potted(10, 5, 5)).unwrap();
        assert_eq!(price, Price::from_int(120).unwrap());
    }

    #[test]
    fn bouquet_price_is_its_base() {
        let mut ty = potted(10, 5, 5);
        ty.kind = ProductKind::Bouquet;
        let base: Price = "87.5".parse().unwrap();
        assert_eq!(product_price(base, &ty).unwrap(), base);
    }

    #[test]
    fn price_rounds_to_one_decimal() {
        // 33.3 + 33.3 × 15% = 38.295 → 38.3
        let price = product_price("33.3".parse().unwrap(), &potted(5, 5, 5)).unwrap();
        assert_eq!(price, "38.3".parse().unwrap());
    }

    #[test]
    fn florist_commission_is_a_share_of_base() {
        let c = florist_commission(Price::from_int(100).unwrap(), Percent::new(5)).unwrap();
        assert_eq!(c, Money::from_int(5).unwrap());
    }

    #[test]
    fn courier_commission_sums_each_line_at_its_own_rate() {
        let lines = [line(100, 5), line(200, 10)];
        let c = courier_commission(&lines, CourierCommissionPolicy::PerLineItem).unwrap();
        assert_eq!(c, Money::from_int(25).unwrap());
    }

    #[test]
    fn legacy_policy_applies_first_rate_to_summed_base() {
        let lines = [line(100, 5), line(200, 10)];
        let c = courier_commission(&lines, CourierCommissionPolicy::LegacyFirstRate).unwrap();
        assert_eq!(c, Money::from_int(15).unwrap());
    }

    #[test]
    fn empty_order_earns_nothing() {
        for policy in [
            CourierCommissionPolicy::PerLineItem,
            CourierCommissionPolicy::LegacyFirstRate,
        ] {
            assert_eq!(courier_commission(&[], policy).unwrap(), Money::zero());
        }
    }

    #[test]
    fn policy_names_are_snake_case() {
        let json = serde_json::to_string(&CourierCommissionPolicy::LegacyFirstRate).unwrap();
        assert_eq!(json, "\"legacy_first_rate\"");
    }

    proptest! {
        #[test]
        fn policies_agree_on_a_single_rate(
            bases in prop::collection::vec(0i64..10_000, 1..8),
            rate in 0u32..40,
        ) {
            let lines: Vec<_> = bases.iter().map(|b| line(*b, rate)).collect();
            let per_line = courier_commission(&lines, CourierCommissionPolicy::PerLineItem).unwrap();
            let legacy = courier_commission(&lines, CourierCommissionPolicy::LegacyFirstRate).unwrap();
            prop_assert_eq!(per_line, legacy);
        }
    }
}
