use serde::{Deserialize, Serialize};

use bloomshop_core::{DomainError, DomainResult, Entity, FlowerId, Price};

/// A stock flower that florists compose products from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flower {
    pub id: FlowerId,
    pub name: String,
    pub price: Price,
    pub total_quantity: u32,
}

impl Flower {
    /// Move `quantity` stems out of stock.
    pub fn take(&mut self, quantity: u32) -> DomainResult<()> {
        if quantity > self.total_quantity {
            return Err(DomainError::invalid_state(format!(
                "only {} stems of '{}' left, {quantity} requested",
                self.total_quantity, self.name
            )));
        }
        self.total_quantity -= quantity;
        Ok(())
    }

    pub fn restock(&mut self, quantity: u32) {
        self.total_quantity = self.total_quantity.saturating_add(quantity);
    }
}

impl Entity for Flower {
    type Id = FlowerId;
    const KIND: &'static str = "flower";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
