use chrono::Utc;

use bloomshop_auth::{Capabilities, Requester, permissions};
use bloomshop_catalog::{Favorite, Product, ProductStatus};
use bloomshop_core::{FavoriteId, ProductId, UserId};

use super::{ShopService, load};
use crate::error::ServiceError;
use crate::store::ShopStore;

/// How many products the new arrivals listing shows.
pub const NEW_PRODUCTS_LIMIT: usize = 10;

fn client_id(caps: &Capabilities) -> Result<UserId, ServiceError> {
    caps.require(&permissions::FAVORITES_WRITE)?;
    caps.user_id()
        .ok_or_else(|| ServiceError::Permission("favorites need a signed-in client".to_string()))
}

impl<S: ShopStore> ShopService<S> {
    /// Bookmark a product for the requesting client.
    #[tracing::instrument(skip(self), err)]
    pub fn add_favorite(
        &self,
        product_id: ProductId,
        requester: Requester,
    ) -> Result<Favorite, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        let client = client_id(&caps)?;

        self.run("add_favorite", |tx| {
            let product: Product = load(tx, product_id)?;
            if product.status() == ProductStatus::Removed {
                return Err(ServiceError::InvalidState(format!(
                    "product {product_id} is no longer offered"
                )));
            }
            let already = tx
                .list::<Favorite>()?
                .iter()
                .any(|f| f.belongs_to(client) && f.product == product_id);
            if already {
                return Err(ServiceError::InvalidState(format!(
                    "product {product_id} is already a favorite"
                )));
            }

            let favorite = Favorite::new(client, product_id, Utc::now());
            tx.put(favorite.clone())?;
            Ok(favorite)
        })
    }

    /// The requesting client's favorites, oldest first.
    pub fn list_favorites(&self, requester: Requester) -> Result<Vec<Favorite>, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        let client = client_id(&caps)?;

        let mut favorites: Vec<Favorite> = self.query(|tx| Ok(tx.list::<Favorite>()?))?;
        favorites.retain(|f| f.belongs_to(client));
        favorites.sort_by_key(|f| f.added_at);
        Ok(favorites)
    }

    #[tracing::instrument(skip(self), err)]
    pub fn remove_favorite(
        &self,
        favorite_id: FavoriteId,
        requester: Requester,
    ) -> Result<(), ServiceError> {
        let caps = Capabilities::resolve(&requester);
        client_id(&caps)?;

        self.run("remove_favorite", |tx| {
            let favorite: Favorite = load(tx, favorite_id)?;
            caps.require_owner(favorite.client, "favorite")?;
            tx.delete::<Favorite>(favorite_id)?;
            Ok(())
        })
    }

    /// The most recently listed products still for sale, newest first.
    pub fn list_new_products(&self, requester: Requester) -> Result<Vec<Product>, ServiceError> {
        let caps = Capabilities::resolve(&requester);
        caps.require(&permissions::CATALOG_BROWSE)?;

        let mut products: Vec<Product> = self.query(|tx| Ok(tx.list::<Product>()?))?;
        products.retain(Product::is_for_sale);
        products.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        products.truncate(NEW_PRODUCTS_LIMIT);
        Ok(products)
    }
}
