//! Per-employee earnings history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloomshop_catalog::{
    CommissionLine, CourierCommissionPolicy, Product, ProductStatus, ProductType, pricing,
};
use bloomshop_core::{DomainResult, Money, OrderId, ProductId, UserId};
use bloomshop_sales::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EarningSource {
    /// A delivered order (courier).
    Order(OrderId),
    /// A sold product (florist).
    Product(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningRecord {
    pub source: EarningSource,
    pub earned_at: Option<DateTime<Utc>>,
    pub commission: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsHistory {
    pub employee: UserId,
    pub records: Vec<EarningRecord>,
    pub total_earnings: Money,
}

impl EarningsHistory {
    pub fn from_records(employee: UserId, records: Vec<EarningRecord>) -> DomainResult<Self> {
        let total_earnings = Money::sum(records.iter().map(|r| r.commission))?;
        Ok(Self {
            employee,
            records,
            total_earnings,
        })
    }

    /// Delivered orders of `courier`, each paired with the commission lines
    /// of the products it carried.
    pub fn for_courier<'a>(
        courier: UserId,
        orders: impl IntoIterator<Item = (&'a Order, Vec<CommissionLine>)>,
        policy: CourierCommissionPolicy,
    ) -> DomainResult<Self> {
        let mut records = Vec::new();
        for (order, lines) in orders {
            if order.status() != OrderStatus::Delivered || order.courier() != Some(courier) {
                continue;
            }
            let delivered_at = order
                .history()
                .iter()
                .rev()
                .find(|c| c.to == OrderStatus::Delivered)
                .map(|c| c.at);
            records.push(EarningRecord {
                source: EarningSource::Order(order.id_typed()),
                earned_at: delivered_at,
                commission: pricing::courier_commission(&lines, policy)?,
            });
        }
        Self::from_records(courier, records)
    }

    /// Sold products of `florist` with their product types.
    pub fn for_florist<'a>(
        florist: UserId,
        products: impl IntoIterator<Item = (&'a Product, &'a ProductType)>,
    ) -> DomainResult<Self> {
        let mut records = Vec::new();
        for (product, product_type) in products {
            if product.status() != ProductStatus::Sold || product.florist() != florist {
                continue;
            }
            records.push(EarningRecord {
                source: EarningSource::Product(product.id_typed()),
                earned_at: product.sale_timestamp(),
                commission: product.florist_commission(product_type)?,
            });
        }
        Self::from_records(florist, records)
    }
}
