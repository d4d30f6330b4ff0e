use chrono::Utc;

use bloomshop_auth::{Capabilities, Requester, Role, permissions};
use bloomshop_catalog::{Product, ProductType};
use bloomshop_core::{ProductTypeId, UserId};
use bloomshop_reporting::{EarningsHistory, Statistics, StatisticsKind};
use bloomshop_sales::{Order, OrderStatus};
use bloomshop_staff::User;

use super::order::{commission_lines, order_products};
use super::{ShopService, load};
use crate::error::ServiceError;
use crate::store::ShopStore;

impl<S: ShopStore> ShopService<S> {
    /// Windowed order counts or revenue.
    ///
    /// `window` is the raw query value; a missing or unknown one yields the
    /// informational fallback rather than an error.
    #[tracing::instrument(skip(self), err)]
    pub fn get_statistics(
        &self,
        window: Option<&str>,
        kind: StatisticsKind,
        requester: Requester,
    ) -> Result<Statistics, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::STATISTICS_READ)?;

        self.query(|tx| {
            let orders = match kind {
                StatisticsKind::OrderCount => tx.list::<Order>()?,
                StatisticsKind::Revenue => Vec::new(),
            };
            let products = match kind {
                StatisticsKind::Revenue => tx.list::<Product>()?,
                StatisticsKind::OrderCount => Vec::new(),
            };
            Ok(bloomshop_reporting::statistics(
                window,
                kind,
                Utc::now(),
                &orders,
                &products,
            )?)
        })
    }

    /// Commission history of a courier or florist.
    ///
    /// Employees read their own history; admins read anyone's.
    #[tracing::instrument(skip(self), err)]
    pub fn get_earnings_history(
        &self,
        employee: UserId,
        requester: Requester,
    ) -> Result<EarningsHistory, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        if !caps.is_admin() {
            caps.require(&permissions::EARNINGS_READ)?;
            caps.require_owner(employee, "earnings history")?;
        }
        let policy = self.config().courier_commission;

        self.query(|tx| {
            let user: User = load(tx, employee)?;
            match user.role() {
                Role::Courier => {
                    let mut delivered = Vec::new();
                    for order in tx.list::<Order>()? {
                        if order.status() != OrderStatus::Delivered
                            || order.courier() != Some(employee)
                        {
                            continue;
                        }
                        let (_, products) = order_products(tx, &order)?;
                        let lines = commission_lines(&products)?;
                        delivered.push((order, lines));
                    }
                    Ok(EarningsHistory::for_courier(
                        employee,
                        delivered.iter().map(|(o, lines)| (o, lines.clone())),
                        policy,
                    )?)
                }
                Role::Florist => {
                    let mut sold = Vec::new();
                    for product in tx.list::<Product>()? {
                        if product.florist() != employee {
                            continue;
                        }
                        let type_id: ProductTypeId = product.product_type();
                        let product_type: ProductType = load(tx, type_id)?;
                        sold.push((product, product_type));
                    }
                    Ok(EarningsHistory::for_florist(
                        employee,
                        sold.iter().map(|(p, ty)| (p, ty)),
                    )?)
                }
                other => Err(ServiceError::InvalidState(format!(
                    "{other} accounts earn no commissions"
                ))),
            }
        })
    }
}
