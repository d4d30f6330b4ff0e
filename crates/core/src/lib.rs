//! `bloomshop-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot, DomainEvent, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CartId, FavoriteId, FlowerId, OrderId, ProductId, ProductTypeId, UserId};
pub use money::{Money, Percent, Price};
