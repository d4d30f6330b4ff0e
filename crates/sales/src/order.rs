use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloomshop_core::{
    Aggregate, AggregateRoot, CartId, DomainError, DomainEvent, Entity, Money, OrderId, Price,
    UserId,
};

use crate::delivery::{DeliveryDetails, DeliveryFields};

/// Order status lifecycle, in order.
///
/// Movement is forward only. `Delivered` is reachable only from `InTransit`;
/// `Cancelled` from any non-terminal state. `Delivered` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingReview,
    AwaitingCourier,
    CourierAccepted,
    CourierEnRoute,
    AtCourier,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            OrderStatus::PendingReview => 0,
            OrderStatus::AwaitingCourier => 1,
            OrderStatus::CourierAccepted => 2,
            OrderStatus::CourierEnRoute => 3,
            OrderStatus::AtCourier => 4,
            OrderStatus::InTransit => 5,
            OrderStatus::Delivered => 6,
            OrderStatus::Cancelled => 7,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => true,
            OrderStatus::Delivered => self == OrderStatus::InTransit,
            _ => next.rank() > self.rank(),
        }
    }
}

/// Who changes an order's status. Only couriers and admins can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "user_id", rename_all = "snake_case")]
pub enum StatusActor {
    Courier(UserId),
    Admin(UserId),
}

impl StatusActor {
    pub fn user_id(&self) -> UserId {
        match *self {
            StatusActor::Courier(id) | StatusActor::Admin(id) => id,
        }
    }
}

/// One entry of an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_by: UserId,
    pub at: DateTime<Utc>,
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    cart: Option<CartId>,
    client: Option<UserId>,
    delivery: Option<DeliveryDetails>,
    /// Snapshot of the cart total at creation; never recomputed.
    total_price: Price,
    courier: Option<UserId>,
    status: OrderStatus,
    created_at: Option<DateTime<Utc>>,
    history: Vec<StatusChange>,
    version: u64,
}

impl Order {
    /// Create an empty, not-yet-placed aggregate instance.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            cart: None,
            client: None,
            delivery: None,
            total_price: Price::zero(),
            courier: None,
            status: OrderStatus::PendingReview,
            created_at: None,
            history: Vec::new(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn is_placed(&self) -> bool {
        self.cart.is_some()
    }

    pub fn cart(&self) -> Option<CartId> {
        self.cart
    }

    pub fn client(&self) -> Option<UserId> {
        self.client
    }

    pub fn delivery(&self) -> Option<&DeliveryDetails> {
        self.delivery.as_ref()
    }

    pub fn total_price(&self) -> Price {
        self.total_price
    }

    pub fn courier(&self) -> Option<UserId> {
        self.courier
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Change owed to the client, when they asked for change.
    pub fn money_change_value(&self) -> Result<Option<Money>, DomainError> {
        match &self.delivery {
            Some(d) if d.money_change_requested => {
                let change = d.client_money_value.checked_sub(self.total_price.to_money()?)?;
                Ok(Some(change))
            }
            _ => Ok(None),
        }
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Entity for Order {
    type Id = OrderId;
    const KIND: &'static str = "order";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: PlaceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub cart_id: CartId,
    pub client: Option<UserId>,
    pub delivery: DeliveryFields,
    pub total_price: Price,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub actor: StatusActor,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AmendDelivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendDelivery {
    pub order_id: OrderId,
    pub delivery: DeliveryFields,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    ChangeStatus(ChangeStatus),
    AmendDelivery(AmendDelivery),
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub cart_id: CartId,
    pub client: Option<UserId>,
    pub delivery: DeliveryDetails,
    pub total_price: Price,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CourierAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierAssigned {
    pub order_id: OrderId,
    pub courier: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DeliveryAmended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAmended {
    pub order_id: OrderId,
    pub delivery: DeliveryDetails,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    CourierAssigned(CourierAssigned),
    StatusChanged(StatusChanged),
    DeliveryAmended(DeliveryAmended),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "sales.order.placed",
            OrderEvent::CourierAssigned(_) => "sales.order.courier_assigned",
            OrderEvent::StatusChanged(_) => "sales.order.status_changed",
            OrderEvent::DeliveryAmended(_) => "sales.order.delivery_amended",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::CourierAssigned(e) => e.occurred_at,
            OrderEvent::StatusChanged(e) => e.occurred_at,
            OrderEvent::DeliveryAmended(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.cart = Some(e.cart_id);
                self.client = e.client;
                self.delivery = Some(e.delivery.clone());
                self.total_price = e.total_price;
                self.status = OrderStatus::PendingReview;
                self.created_at = Some(e.occurred_at);
            }
            OrderEvent::CourierAssigned(e) => {
                self.courier = Some(e.courier);
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
                self.history.push(StatusChange {
                    from: e.from,
                    to: e.to,
                    changed_by: e.changed_by,
                    at: e.occurred_at,
                });
            }
            OrderEvent::DeliveryAmended(e) => {
                self.delivery = Some(e.delivery.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            OrderCommand::AmendDelivery(cmd) => self.handle_amend(cmd),
        }
    }
}

impl Order {
    fn ensure_placed(&self, order_id: OrderId) -> Result<(), DomainError> {
        if !self.is_placed() || self.id != order_id {
            return Err(DomainError::not_found("order", order_id));
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.is_placed() {
            return Err(DomainError::invalid_state(format!(
                "order {} already exists",
                cmd.order_id
            )));
        }
        let delivery = cmd.delivery.validate()?;

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            cart_id: cmd.cart_id,
            client: cmd.client,
            delivery,
            total_price: cmd.total_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;

        if !self.status.can_transition_to(cmd.status) {
            return Err(DomainError::invalid_state(format!(
                "order {} cannot move from {:?} to {:?}",
                self.id, self.status, cmd.status
            )));
        }

        let mut events = Vec::with_capacity(2);
        let mut courier = self.courier;

        if let StatusActor::Courier(acting) = cmd.actor {
            match self.courier {
                Some(assigned) if assigned != acting => {
                    return Err(DomainError::permission(format!(
                        "order {} is assigned to another courier",
                        self.id
                    )));
                }
                Some(_) => {}
                None => {
                    courier = Some(acting);
                    events.push(OrderEvent::CourierAssigned(CourierAssigned {
                        order_id: self.id,
                        courier: acting,
                        occurred_at: cmd.occurred_at,
                    }));
                }
            }
        }

        if cmd.status == OrderStatus::Delivered && courier.is_none() {
            return Err(DomainError::invalid_state(format!(
                "order {} has no courier to deliver it",
                self.id
            )));
        }

        events.push(OrderEvent::StatusChanged(StatusChanged {
            order_id: self.id,
            from: self.status,
            to: cmd.status,
            changed_by: cmd.actor.user_id(),
            occurred_at: cmd.occurred_at,
        }));
        Ok(events)
    }

    fn handle_amend(&self, cmd: &AmendDelivery) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;

        if self.status != OrderStatus::PendingReview {
            return Err(DomainError::invalid_state(format!(
                "delivery of order {} can only change while pending review",
                self.id
            )));
        }
        let delivery = cmd.delivery.validate()?;

        Ok(vec![OrderEvent::DeliveryAmended(DeliveryAmended {
            order_id: self.id,
            delivery,
            occurred_at: cmd.occurred_at,
        })])
    }
}
