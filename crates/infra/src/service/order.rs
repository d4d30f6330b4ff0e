use chrono::{DateTime, Utc};

use bloomshop_auth::{Actor, Capabilities, Requester, permissions};
use bloomshop_catalog::{CommissionLine, Product, ProductType, pricing};
use bloomshop_core::{Aggregate, CartId, DomainEvent, Money, OrderId, UserId};
use bloomshop_sales::{
    AmendDelivery, Cart, ChangeStatus, DeliveryFields, Order, OrderCommand, OrderEvent,
    OrderStatus, PlaceOrder, StatusActor,
};
use bloomshop_staff::EmployeeProfile;

use super::{ShopService, load};
use crate::error::ServiceError;
use crate::store::{ShopStore, Transaction};

/// Products of an order's cart together with their product types.
pub(super) fn order_products<S: ShopStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    order: &Order,
) -> Result<(Cart, Vec<(Product, ProductType)>), ServiceError> {
    let cart_id = order.cart().ok_or_else(|| ServiceError::NotFound {
        entity: "cart",
        id: format!("of order {}", order.id_typed()),
    })?;
    let cart: Cart = load(tx, cart_id)?;

    let mut products = Vec::with_capacity(cart.lines().len());
    for product_id in cart.product_ids() {
        let product: Product = load(tx, product_id)?;
        let product_type: ProductType = load(tx, product.product_type())?;
        products.push((product, product_type));
    }
    Ok((cart, products))
}

/// Log the events a committed order operation produced.
fn trace_events(events: &[OrderEvent]) {
    for event in events {
        tracing::debug!(
            event_type = event.event_type(),
            occurred_at = %event.occurred_at(),
            "order event"
        );
    }
}

pub(super) fn commission_lines(
    products: &[(Product, ProductType)],
) -> Result<Vec<CommissionLine>, ServiceError> {
    products
        .iter()
        .map(|(p, ty)| p.commission_line(ty).map_err(ServiceError::from))
        .collect()
}

fn credit<S: ShopStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    employee: UserId,
    amount: Money,
) -> Result<(), ServiceError> {
    let mut profile: EmployeeProfile = load(tx, employee)?;
    profile.credit(amount)?;
    tx.put(profile)?;
    Ok(())
}

fn status_actor(caps: &Capabilities) -> Result<StatusActor, ServiceError> {
    match caps.actor() {
        Actor::Courier(id) => Ok(StatusActor::Courier(id)),
        Actor::Admin(id) => Ok(StatusActor::Admin(id)),
        other => Err(ServiceError::Permission(format!(
            "{} cannot change order status",
            other.label()
        ))),
    }
}

/// Admins see every order; couriers see unassigned orders and their own;
/// clients see the orders they placed.
fn ensure_order_visible(caps: &Capabilities, order: &Order) -> Result<(), ServiceError> {
    let visible = match caps.actor() {
        Actor::Admin(_) => true,
        Actor::Courier(id) => order.courier().is_none_or(|c| c == id),
        Actor::Client(id) => order.client() == Some(id),
        Actor::Florist(_) | Actor::Anonymous => false,
    };
    if visible {
        Ok(())
    } else {
        Err(ServiceError::Permission(format!(
            "{} cannot view order {}",
            caps.actor(),
            order.id_typed()
        )))
    }
}

impl<S: ShopStore> ShopService<S> {
    /// Place an order from a cart: reserve every product, freeze the cart and
    /// snapshot its total.
    #[tracing::instrument(skip(self, delivery), err)]
    pub fn create_order(
        &self,
        cart_id: CartId,
        requester: Requester,
        delivery: DeliveryFields,
    ) -> Result<Order, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::ORDER_PLACE)?;

        let (order, events) = self.run("create_order", |tx| {
            let mut cart: Cart = load(tx, cart_id)?;
            if let Some(user) = caps.user_id() {
                if cart.client() != Some(user) {
                    return Err(ServiceError::Permission(format!(
                        "cart {cart_id} belongs to another user"
                    )));
                }
            }
            if cart.is_ordered() {
                return Err(ServiceError::InvalidState(format!(
                    "cart {cart_id} is already ordered"
                )));
            }
            if cart.lines().is_empty() {
                return Err(ServiceError::InvalidState(format!("cart {cart_id} is empty")));
            }

            let order_id = OrderId::new();
            let mut order = Order::empty(order_id);
            let events = order.execute(&OrderCommand::PlaceOrder(PlaceOrder {
                order_id,
                cart_id,
                client: caps.user_id(),
                delivery: delivery.clone(),
                total_price: cart.total_price()?,
                occurred_at: Utc::now(),
            }))?;

            let product_ids: Vec<_> = cart.product_ids().collect();
            for product_id in product_ids {
                let mut product: Product = load(tx, product_id)?;
                product.reserve()?;
                tx.put(product)?;
            }
            cart.mark_ordered()?;
            tx.put(cart)?;
            tx.put(order.clone())?;
            Ok((order, events))
        })?;
        trace_events(&events);

        tracing::info!(
            order_id = %order.id_typed(),
            cart_id = %cart_id,
            total_price = %order.total_price(),
            "order placed"
        );
        Ok(order)
    }

    /// Move an order to `status`, applying the side effects of cancellation
    /// and delivery in the same transaction.
    #[tracing::instrument(skip(self), err)]
    pub fn transition_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        requester: Requester,
    ) -> Result<Order, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::ORDER_STATUS_UPDATE)?;
        let actor = status_actor(&caps)?;
        let policy = self.config().courier_commission;

        let (order, from, events) = self.run("transition_status", |tx| {
            let mut order: Order = load(tx, order_id)?;
            let from = order.status();
            let now = Utc::now();
            let events = order.execute(&OrderCommand::ChangeStatus(ChangeStatus {
                order_id,
                status,
                actor,
                occurred_at: now,
            }))?;

            match status {
                OrderStatus::Cancelled => release_products(tx, &order)?,
                OrderStatus::Delivered => settle_delivery(tx, &order, now, policy)?,
                _ => {}
            }

            tx.put(order.clone())?;
            Ok((order, from, events))
        })?;
        trace_events(&events);

        tracing::info!(
            order_id = %order_id,
            from = ?from,
            to = ?status,
            actor = %caps.actor(),
            "order status changed"
        );
        Ok(order)
    }

    /// Edit delivery details while the order awaits review.
    #[tracing::instrument(skip(self, delivery), err)]
    pub fn amend_delivery(
        &self,
        order_id: OrderId,
        delivery: DeliveryFields,
        requester: Requester,
    ) -> Result<Order, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::ORDER_AMEND)?;

        let (order, events) = self.run("amend_delivery", |tx| {
            let mut order: Order = load(tx, order_id)?;
            let owner = order.client().ok_or_else(|| {
                ServiceError::Permission(format!("order {order_id} was placed anonymously"))
            })?;
            caps.require_owner(owner, "order")?;

            let events = order.execute(&OrderCommand::AmendDelivery(AmendDelivery {
                order_id,
                delivery: delivery.clone(),
                occurred_at: Utc::now(),
            }))?;
            tx.put(order.clone())?;
            Ok((order, events))
        })?;
        trace_events(&events);

        tracing::info!(order_id = %order_id, "delivery details amended");
        Ok(order)
    }

    pub fn get_order(&self, order_id: OrderId, requester: Requester) -> Result<Order, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        self.query(|tx| {
            let order: Order = load(tx, order_id)?;
            ensure_order_visible(&caps, &order)?;
            Ok(order)
        })
    }

    /// Courier work queue, oldest first.
    pub fn list_orders_awaiting_courier(
        &self,
        requester: Requester,
    ) -> Result<Vec<Order>, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::ORDER_STATUS_UPDATE)?;

        let mut orders = self.query(|tx| Ok(tx.list::<Order>()?))?;
        orders.retain(|o| o.status() == OrderStatus::AwaitingCourier && o.courier().is_none());
        orders.sort_by_key(|o| o.created_at());
        tracing::debug!(count = orders.len(), "listed orders awaiting a courier");
        Ok(orders)
    }

    /// Orders assigned to `courier`, oldest first.
    pub fn list_courier_orders(
        &self,
        courier: UserId,
        requester: Requester,
    ) -> Result<Vec<Order>, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::ORDER_STATUS_UPDATE)?;
        if !caps.is_admin() {
            caps.require_owner(courier, "courier order list")?;
        }

        let mut orders = self.query(|tx| Ok(tx.list::<Order>()?))?;
        orders.retain(|o| o.courier() == Some(courier));
        orders.sort_by_key(|o| o.created_at());
        Ok(orders)
    }
}

fn release_products<S: ShopStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    order: &Order,
) -> Result<(), ServiceError> {
    let (mut cart, products) = order_products(tx, order)?;
    for (mut product, _) in products {
        product.release()?;
        tx.put(product)?;
    }
    cart.reopen()?;
    tx.put(cart)?;
    Ok(())
}

fn settle_delivery<S: ShopStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    order: &Order,
    at: DateTime<Utc>,
    policy: pricing::CourierCommissionPolicy,
) -> Result<(), ServiceError> {
    let (_, products) = order_products(tx, order)?;

    let courier = order.courier().ok_or_else(|| {
        ServiceError::InvalidState(format!("order {} has no courier", order.id_typed()))
    })?;
    let courier_cut = pricing::courier_commission(&commission_lines(&products)?, policy)?;
    credit(tx, courier, courier_cut)?;

    for (mut product, product_type) in products {
        let florist_cut = product.florist_commission(&product_type)?;
        product.sell(at)?;
        credit(tx, product.florist(), florist_cut)?;
        tx.put(product)?;
    }
    Ok(())
}
