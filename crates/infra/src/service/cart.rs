use chrono::Utc;

use bloomshop_auth::{Capabilities, Requester, permissions};
use bloomshop_catalog::Product;
use bloomshop_core::{CartId, ProductId};
use bloomshop_sales::Cart;

use super::{ShopService, load};
use crate::error::ServiceError;
use crate::store::ShopStore;

/// Clients may only touch their own cart; anonymous carts belong to
/// anonymous requesters.
pub(super) fn ensure_cart_access(caps: &Capabilities, cart: &Cart) -> Result<(), ServiceError> {
    match (cart.client(), caps.user_id()) {
        (Some(owner), _) => Ok(caps.require_owner(owner, "cart")?),
        (None, None) => Ok(()),
        (None, Some(_)) => Err(ServiceError::Permission(
            "anonymous carts cannot be used by signed-in users".to_string(),
        )),
    }
}

impl<S: ShopStore> ShopService<S> {
    #[tracing::instrument(skip(self), err)]
    pub fn create_cart(&self, requester: Requester) -> Result<Cart, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CART_WRITE)?;

        self.run("create_cart", |tx| {
            let cart = Cart::open(CartId::new(), caps.user_id(), Utc::now());
            tx.put(cart.clone())?;
            Ok(cart)
        })
    }

    /// Add `product_id` to the cart, or replace the quantity of its line.
    #[tracing::instrument(skip(self), err)]
    pub fn add_line_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
        requester: Requester,
    ) -> Result<Cart, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CART_WRITE)?;

        self.run("add_line_item", |tx| {
            let mut cart: Cart = load(tx, cart_id)?;
            ensure_cart_access(&caps, &cart)?;
            let product: Product = load(tx, product_id)?;

            cart.add_or_update_line(&product, quantity)?;
            tx.put(cart.clone())?;
            Ok(cart)
        })
    }

    #[tracing::instrument(skip(self), err)]
    pub fn remove_line_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        requester: Requester,
    ) -> Result<Cart, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CART_WRITE)?;

        self.run("remove_line_item", |tx| {
            let mut cart: Cart = load(tx, cart_id)?;
            ensure_cart_access(&caps, &cart)?;

            cart.remove_line(product_id)?;
            tx.put(cart.clone())?;
            Ok(cart)
        })
    }

    pub fn get_cart(&self, cart_id: CartId, requester: Requester) -> Result<Cart, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        self.query(|tx| {
            let cart: Cart = load(tx, cart_id)?;
            if !caps.is_admin() {
                ensure_cart_access(&caps, &cart)?;
            }
            Ok(cart)
        })
    }
}
