use chrono::Utc;

use bloomshop_auth::{Capabilities, Requester, permissions};
use bloomshop_catalog::{Flower, NewProduct, Product, ProductType};
use bloomshop_core::{FlowerId, Price, ProductId};

use super::{ShopService, load};
use crate::error::ServiceError;
use crate::store::ShopStore;

/// Florists manage their own products; admins manage any.
fn ensure_product_owner(caps: &Capabilities, product: &Product) -> Result<(), ServiceError> {
    if caps.is_admin() {
        return Ok(());
    }
    Ok(caps.require_owner(product.florist(), "product")?)
}

impl<S: ShopStore> ShopService<S> {
    #[tracing::instrument(skip(self, product_type), fields(product_type_id = %product_type.id), err)]
    pub fn register_product_type(
        &self,
        product_type: ProductType,
        requester: Requester,
    ) -> Result<ProductType, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_REFERENCE)?;
        if product_type.title.trim().is_empty() {
            return Err(ServiceError::Validation {
                field: "title".to_string(),
                message: "product type must have a title".to_string(),
            });
        }

        self.run("register_product_type", |tx| {
            if tx.get::<ProductType>(product_type.id)?.is_some() {
                return Err(ServiceError::InvalidState(format!(
                    "product type {} already exists",
                    product_type.id
                )));
            }
            tx.put(product_type.clone())?;
            Ok(product_type.clone())
        })
    }

    /// Add stems to the flower stock, creating the flower if it is new.
    #[tracing::instrument(skip(self, flower), fields(flower_id = %flower.id), err)]
    pub fn stock_flower(&self, flower: Flower, requester: Requester) -> Result<Flower, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_REFERENCE)?;

        self.run("stock_flower", |tx| {
            let stocked = match tx.get::<Flower>(flower.id)? {
                Some(mut existing) => {
                    existing.restock(flower.total_quantity);
                    existing
                }
                None => flower.clone(),
            };
            tx.put(stocked.clone())?;
            Ok(stocked)
        })
    }

    /// List a new product for sale under the requesting florist.
    #[tracing::instrument(skip(self, input), fields(product_id = %input.id), err)]
    pub fn list_product(
        &self,
        input: NewProduct,
        requester: Requester,
    ) -> Result<Product, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_COMPOSE)?;
        caps.require_owner(input.florist, "product")?;

        let product = self.run("list_product", |tx| {
            if tx.get::<Product>(input.id)?.is_some() {
                return Err(ServiceError::InvalidState(format!(
                    "product {} already exists",
                    input.id
                )));
            }
            let product_type: ProductType = load(tx, input.product_type)?;
            let product = Product::list(input.clone(), &product_type, Utc::now())?;
            tx.put(product.clone())?;
            Ok(product)
        })?;

        tracing::info!(product_id = %product.id_typed(), price = %product.price(), "product listed");
        Ok(product)
    }

    /// Replace the base price and recompute the sale price.
    #[tracing::instrument(skip(self), err)]
    pub fn update_product_base_price(
        &self,
        product_id: ProductId,
        base_price: Price,
        requester: Requester,
    ) -> Result<Product, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_PRICE)?;

        let product = self.run("update_product_base_price", |tx| {
            let mut product: Product = load(tx, product_id)?;
            ensure_product_owner(&caps, &product)?;
            let product_type: ProductType = load(tx, product.product_type())?;

            product.reprice(base_price, &product_type)?;
            tx.put(product.clone())?;
            Ok(product)
        })?;

        tracing::info!(product_id = %product_id, price = %product.price(), "product repriced");
        Ok(product)
    }

    /// Set the sale price of a product whose kind has no allowance.
    #[tracing::instrument(skip(self), err)]
    pub fn set_product_price(
        &self,
        product_id: ProductId,
        price: Price,
        requester: Requester,
    ) -> Result<Product, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_PRICE)?;

        self.run("set_product_price", |tx| {
            let mut product: Product = load(tx, product_id)?;
            ensure_product_owner(&caps, &product)?;
            let product_type: ProductType = load(tx, product.product_type())?;

            product.set_price(price, &product_type)?;
            tx.put(product.clone())?;
            Ok(product)
        })
    }

    /// Move `quantity` stems of a stock flower into the product.
    #[tracing::instrument(skip(self), err)]
    pub fn add_flower_to_product(
        &self,
        product_id: ProductId,
        flower_id: FlowerId,
        quantity: u32,
        requester: Requester,
    ) -> Result<Product, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_COMPOSE)?;

        self.run("add_flower_to_product", |tx| {
            let mut product: Product = load(tx, product_id)?;
            caps.require_owner(product.florist(), "product")?;
            let product_type: ProductType = load(tx, product.product_type())?;
            let mut flower: Flower = load(tx, flower_id)?;

            product.add_flower(&mut flower, quantity, &product_type)?;
            tx.put(flower)?;
            tx.put(product.clone())?;
            Ok(product)
        })
    }

    /// Take a flower out of the product and return its stems to stock.
    #[tracing::instrument(skip(self), err)]
    pub fn remove_flower_from_product(
        &self,
        product_id: ProductId,
        flower_id: FlowerId,
        requester: Requester,
    ) -> Result<Product, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_COMPOSE)?;

        self.run("remove_flower_from_product", |tx| {
            let mut product: Product = load(tx, product_id)?;
            caps.require_owner(product.florist(), "product")?;
            let product_type: ProductType = load(tx, product.product_type())?;
            let mut flower: Flower = load(tx, flower_id)?;

            product.remove_flower(&mut flower, &product_type)?;
            tx.put(flower)?;
            tx.put(product.clone())?;
            Ok(product)
        })
    }

    #[tracing::instrument(skip(self), err)]
    pub fn remove_product(
        &self,
        product_id: ProductId,
        requester: Requester,
    ) -> Result<Product, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_REMOVE)?;

        let product = self.run("remove_product", |tx| {
            let mut product: Product = load(tx, product_id)?;
            ensure_product_owner(&caps, &product)?;
            product.remove()?;
            tx.put(product.clone())?;
            Ok(product)
        })?;

        tracing::info!(product_id = %product_id, "product removed");
        Ok(product)
    }

    pub fn get_product(&self, product_id: ProductId) -> Result<Product, ServiceError> {
        self.query(|tx| load(tx, product_id))
    }

    pub fn get_flower(&self, flower_id: FlowerId) -> Result<Flower, ServiceError> {
        self.query(|tx| load(tx, flower_id))
    }
}
