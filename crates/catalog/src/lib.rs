//! Flower shop catalog: products, product types, stock flowers, client
//! favorites and the pricing calculator.
//!
//! Pure domain logic (no IO, no storage).

pub mod favorite;
pub mod flower;
pub mod pricing;
pub mod product;

pub use favorite::Favorite;
pub use flower::Flower;
pub use pricing::{CommissionLine, CourierCommissionPolicy};
pub use product::{NewProduct, Product, ProductComponent, ProductKind, ProductStatus, ProductType};
