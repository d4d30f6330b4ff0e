use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloomshop_core::{
    DomainError, DomainResult, Entity, FlowerId, Money, Percent, Price, ProductId, ProductTypeId,
    UserId,
};

use crate::flower::Flower;
use crate::pricing;

/// Product status lifecycle.
///
/// `ForSale → Reserved → Sold`, `Reserved → ForSale` on cancellation,
/// `ForSale → Removed` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    ForSale,
    Reserved,
    Sold,
    Removed,
}

/// Product category. Only `Potted` carries the allowance markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Bouquet,
    Potted,
}

/// Immutable allowance reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub title: String,
    pub kind: ProductKind,
    pub allowance: Percent,
    pub florist_allowance: Percent,
    pub courier_allowance: Percent,
}

impl ProductType {
    pub fn bears_allowance(&self) -> bool {
        self.kind == ProductKind::Potted
    }

    /// Shop + florist + courier allowance.
    pub fn total_allowance(&self) -> Percent {
        self.allowance + self.florist_allowance + self.courier_allowance
    }
}

impl Entity for ProductType {
    type Id = ProductTypeId;
    const KIND: &'static str = "product type";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Flowers a product is composed of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductComponent {
    pub flower_id: FlowerId,
    pub quantity: u32,
    /// `flower.price × quantity` at the time the stems were added.
    pub line_price: Price,
}

/// Input for listing a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub product_type: ProductTypeId,
    pub florist: UserId,
    pub base_price: Price,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    product_type: ProductTypeId,
    florist: UserId,
    base_price: Price,
    price: Price,
    status: ProductStatus,
    components: Vec<ProductComponent>,
    created_at: DateTime<Utc>,
    sale_timestamp: Option<DateTime<Utc>>,
}

impl Product {
    pub fn list(
        input: NewProduct,
        product_type: &ProductType,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }
        if input.product_type != product_type.id {
            return Err(DomainError::validation(
                "product_type",
                "product type does not match the given reference data",
            ));
        }

        Ok(Self {
            id: input.id,
            name: input.name,
            product_type: input.product_type,
            florist: input.florist,
            base_price: input.base_price,
            price: pricing::product_price(input.base_price, product_type)?,
            status: ProductStatus::ForSale,
            components: Vec::new(),
            created_at,
            sale_timestamp: None,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_type(&self) -> ProductTypeId {
        self.product_type
    }

    pub fn florist(&self) -> UserId {
        self.florist
    }

    /// Price without allowance.
    pub fn base_price(&self) -> Price {
        self.base_price
    }

    /// Sale price.
    pub fn price(&self) -> Price {
        self.price
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn components(&self) -> &[ProductComponent] {
        &self.components
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn sale_timestamp(&self) -> Option<DateTime<Utc>> {
        self.sale_timestamp
    }

    pub fn is_for_sale(&self) -> bool {
        self.status == ProductStatus::ForSale
    }

    pub fn florist_commission(&self, product_type: &ProductType) -> DomainResult<Money> {
        self.ensure_type(product_type)?;
        pricing::florist_commission(self.base_price, product_type.florist_allowance)
    }

    pub fn commission_line(&self, product_type: &ProductType) -> DomainResult<pricing::CommissionLine> {
        self.ensure_type(product_type)?;
        Ok(pricing::CommissionLine {
            base_price: self.base_price,
            courier_allowance: product_type.courier_allowance,
        })
    }

    /// Replace the base price and recompute the sale price.
    pub fn reprice(&mut self, base_price: Price, product_type: &ProductType) -> DomainResult<()> {
        self.ensure_type(product_type)?;
        self.ensure_status(ProductStatus::ForSale, "reprice")?;
        self.price = pricing::product_price(base_price, product_type)?;
        self.base_price = base_price;
        Ok(())
    }

    /// Set the sale price directly. Not allowed for the allowance-bearing kind,
    /// whose price is always derived.
    pub fn set_price(&mut self, price: Price, product_type: &ProductType) -> DomainResult<()> {
        self.ensure_type(product_type)?;
        self.ensure_status(ProductStatus::ForSale, "set the price of")?;
        if product_type.bears_allowance() {
            return Err(DomainError::invalid_state(format!(
                "price of '{}' products is derived from the base price",
                product_type.title
            )));
        }
        self.price = price;
        Ok(())
    }

    /// Add `quantity` stems of `flower`, taking them out of stock.
    pub fn add_flower(
        &mut self,
        flower: &mut Flower,
        quantity: u32,
        product_type: &ProductType,
    ) -> DomainResult<()> {
        self.ensure_type(product_type)?;
        self.ensure_status(ProductStatus::ForSale, "recompose")?;
        if quantity == 0 {
            return Err(DomainError::validation("quantity", "quantity must be positive"));
        }

        let line = flower.price.times(quantity)?;
        let base_price = self.base_price.checked_add(line)?;
        let price = if product_type.bears_allowance() {
            pricing::product_price(base_price, product_type)?
        } else {
            self.price.checked_add(line)?
        };
        flower.take(quantity)?;

        self.base_price = base_price;
        self.price = price;
        match self.components.iter_mut().find(|c| c.flower_id == flower.id) {
            Some(existing) => {
                existing.quantity += quantity;
                existing.line_price = existing.line_price.checked_add(line)?;
            }
            None => self.components.push(ProductComponent {
                flower_id: flower.id,
                quantity,
                line_price: line,
            }),
        }
        Ok(())
    }

    /// Remove a flower component, returning its stems to stock.
    pub fn remove_flower(&mut self, flower: &mut Flower, product_type: &ProductType) -> DomainResult<()> {
        self.ensure_type(product_type)?;
        self.ensure_status(ProductStatus::ForSale, "recompose")?;

        let idx = self
            .components
            .iter()
            .position(|c| c.flower_id == flower.id)
            .ok_or_else(|| DomainError::not_found("product component", flower.id))?;
        let component = &self.components[idx];

        let uncovered = |_: DomainError| {
            DomainError::invalid_state(format!(
                "price no longer covers the {} stems being removed",
                component.quantity
            ))
        };
        let base_price = self.base_price.checked_sub(component.line_price).map_err(uncovered)?;
        let price = if product_type.bears_allowance() {
            pricing::product_price(base_price, product_type)?
        } else {
            self.price.checked_sub(component.line_price).map_err(uncovered)?
        };

        let component = self.components.remove(idx);
        self.base_price = base_price;
        self.price = price;
        flower.restock(component.quantity);
        Ok(())
    }

    /// `ForSale → Reserved`, when an order is placed.
    pub fn reserve(&mut self) -> DomainResult<()> {
        self.ensure_status(ProductStatus::ForSale, "reserve")?;
        self.status = ProductStatus::Reserved;
        Ok(())
    }

    /// `Reserved → ForSale`, when the order is cancelled.
    pub fn release(&mut self) -> DomainResult<()> {
        self.ensure_status(ProductStatus::Reserved, "release")?;
        self.status = ProductStatus::ForSale;
        Ok(())
    }

    /// `Reserved → Sold`, when the order is delivered.
    pub fn sell(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(ProductStatus::Reserved, "sell")?;
        self.status = ProductStatus::Sold;
        self.sale_timestamp = Some(at);
        Ok(())
    }

    /// `ForSale → Removed`. Terminal.
    pub fn remove(&mut self) -> DomainResult<()> {
        self.ensure_status(ProductStatus::ForSale, "remove")?;
        self.status = ProductStatus::Removed;
        Ok(())
    }

    fn ensure_status(&self, expected: ProductStatus, action: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::invalid_state(format!(
                "cannot {action} product {} in status {:?}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    fn ensure_type(&self, product_type: &ProductType) -> DomainResult<()> {
        if product_type.id != self.product_type {
            return Err(DomainError::validation(
                "product_type",
                format!("product {} is not of type {}", self.id, product_type.id),
            ));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
