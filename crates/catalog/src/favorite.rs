use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloomshop_core::{Entity, FavoriteId, ProductId, UserId};

/// A product a client bookmarked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub client: UserId,
    pub product: ProductId,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(client: UserId, product: ProductId, added_at: DateTime<Utc>) -> Self {
        Self {
            id: FavoriteId::new(),
            client,
            product,
            added_at,
        }
    }

    pub fn belongs_to(&self, client: UserId) -> bool {
        self.client == client
    }
}

impl Entity for Favorite {
    type Id = FavoriteId;
    const KIND: &'static str = "favorite";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
