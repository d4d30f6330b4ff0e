//! Carts and the order lifecycle.
//!
//! Business rules only (no IO, no HTTP, no storage). The order is a
//! command/event aggregate. The service layer applies its effects on carts,
//! products and salaries inside the same transaction.

pub mod cart;
pub mod delivery;
pub mod order;

pub use cart::{Cart, CartLineItem};
pub use delivery::{DeliveryDetails, DeliveryFields};
pub use order::{
    AmendDelivery, ChangeStatus, CourierAssigned, DeliveryAmended, Order, OrderCommand,
    OrderEvent, OrderPlaced, OrderStatus, PlaceOrder, StatusActor, StatusChange, StatusChanged,
};
