use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloomshop_catalog::Product;
use bloomshop_core::{CartId, DomainError, DomainResult, Entity, Price, ProductId, UserId};

/// One product-quantity pairing in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// `product.price × quantity`, recomputed whenever the line is written.
    pub line_price: Price,
}

/// Shopping cart. Mutable only until it is turned into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    client: Option<UserId>,
    is_ordered: bool,
    created_at: DateTime<Utc>,
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// `client` is `None` for anonymous carts.
    pub fn open(id: CartId, client: Option<UserId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            client,
            is_ordered: false,
            created_at,
            lines: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn client(&self) -> Option<UserId> {
        self.client
    }

    pub fn is_ordered(&self) -> bool {
        self.is_ordered
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.lines.iter().map(|l| l.product_id)
    }

    /// Add `product` or replace the quantity of its existing line.
    pub fn add_or_update_line(&mut self, product: &Product, quantity: u32) -> DomainResult<()> {
        self.ensure_mutable()?;
        if !product.is_for_sale() {
            return Err(DomainError::invalid_state(format!(
                "product {} is not for sale ({:?})",
                product.id(),
                product.status()
            )));
        }
        if quantity == 0 {
            return Err(DomainError::validation("quantity", "quantity must be at least 1"));
        }

        let line_price = product.price().times(quantity)?;
        let product_id = *product.id();
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                line.line_price = line_price;
            }
            None => self.lines.push(CartLineItem {
                product_id,
                quantity,
                line_price,
            }),
        }
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: ProductId) -> DomainResult<()> {
        self.ensure_mutable()?;
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(DomainError::not_found("cart line item", product_id));
        }
        Ok(())
    }

    /// Sum of the current line prices; zero for an empty cart.
    pub fn total_price(&self) -> DomainResult<Price> {
        Price::sum(self.lines.iter().map(|l| l.line_price))
    }

    /// Freeze the cart when an order is placed from it.
    pub fn mark_ordered(&mut self) -> DomainResult<()> {
        self.ensure_mutable()?;
        self.is_ordered = true;
        Ok(())
    }

    /// Unfreeze the cart after its order was cancelled.
    pub fn reopen(&mut self) -> DomainResult<()> {
        if !self.is_ordered {
            return Err(DomainError::invalid_state(format!(
                "cart {} is not ordered",
                self.id
            )));
        }
        self.is_ordered = false;
        Ok(())
    }

    fn ensure_mutable(&self) -> DomainResult<()> {
        if self.is_ordered {
            return Err(DomainError::invalid_state(format!(
                "cart {} is already ordered",
                self.id
            )));
        }
        Ok(())
    }
}

impl Entity for Cart {
    type Id = CartId;
    const KIND: &'static str = "cart";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloomshop_catalog::{NewProduct, ProductKind, ProductType};
    use bloomshop_core::{Percent, ProductTypeId};
    use proptest::prelude::*;

    fn bouquet_type() -> ProductType {
        ProductType {
            id: ProductTypeId::new(),
            title: "Bouquet".to_string(),
            kind: ProductKind::Bouquet,
            allowance: Percent::new(10),
            florist_allowance: Percent::new(5),
            courier_allowance: Percent::new(5),
        }
    }

    fn product(ty: &ProductType, price: Price) -> Product {
        Product::list(
            NewProduct {
                id: ProductId::new(),
                name: "Peonies".to_string(),
                product_type: ty.id,
                florist: UserId::new(),
                base_price: price,
            },
            ty,
            Utc::now(),
        )
        .unwrap()
    }

    fn cart() -> Cart {
        Cart::open(CartId::new(), Some(UserId::new()), Utc::now())
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart().total_price().unwrap(), Price::zero());
    }

    #[test]
    fn line_price_is_price_times_quantity() {
        let ty = bouquet_type();
        let p = product(&ty, "12.5".parse().unwrap());
        let mut c = cart();

        c.add_or_update_line(&p, 3).unwrap();
        assert_eq!(c.lines()[0].line_price, "37.5".parse().unwrap());

        c.add_or_update_line(&p, 1).unwrap();
        assert_eq!(c.lines().len(), 1);
        assert_eq!(c.lines()[0].line_price, "12.5".parse().unwrap());
    }

    #[test]
    fn ordered_cart_is_frozen() {
        let ty = bouquet_type();
        let p = product(&ty, Price::from_int(10).unwrap());
        let mut c = cart();
        c.add_or_update_line(&p, 1).unwrap();
        c.mark_ordered().unwrap();

        assert!(matches!(
            c.add_or_update_line(&p, 2),
            Err(DomainError::InvalidState(_))
        ));
        assert!(matches!(
            c.remove_line(*p.id()),
            Err(DomainError::InvalidState(_))
        ));
        assert!(matches!(c.mark_ordered(), Err(DomainError::InvalidState(_))));

        c.reopen().unwrap();
        c.remove_line(*p.id()).unwrap();
        assert!(c.lines().is_empty());
    }

    #[test]
    fn reserved_products_cannot_be_added() {
        let ty = bouquet_type();
        let mut p = product(&ty, Price::from_int(10).unwrap());
        p.reserve().unwrap();
        let err = cart().add_or_update_line(&p, 1).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let ty = bouquet_type();
        let p = product(&ty, Price::from_int(10).unwrap());
        let err = cart().add_or_update_line(&p, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn removing_a_missing_line_is_not_found() {
        let err = cart().remove_line(ProductId::new()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    proptest! {
        #[test]
        fn adding_a_line_grows_total_by_price_times_quantity(
            existing in prop::collection::vec((0i64..5_000, 1u32..5), 0..5),
            raw_price in 0i64..5_000,
            qty in 1u32..10,
        ) {
            let ty = bouquet_type();
            let mut c = cart();
            for (t, q) in existing {
                let p = product(&ty, tenths(t));
                c.add_or_update_line(&p, q).unwrap();
            }
            let before = c.total_price().unwrap();

            let price = tenths(raw_price);
            let p = product(&ty, price);
            c.add_or_update_line(&p, qty).unwrap();

            let expected = before.checked_add(price.times(qty).unwrap()).unwrap();
            prop_assert_eq!(c.total_price().unwrap(), expected);
            let summed = Price::sum(c.lines().iter().map(|l| l.line_price)).unwrap();
            prop_assert_eq!(c.total_price().unwrap(), summed);
        }
    }

    fn tenths(t: i64) -> Price {
        format!("{}.{}", t / 10, t % 10).parse().unwrap()
    }
}
