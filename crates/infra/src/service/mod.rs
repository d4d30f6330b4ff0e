//! Unit-of-work service layer.
//!
//! Every public operation runs inside one [`Transaction`]: it resolves the
//! requester into [`Capabilities`], reads and mutates records, and commits.
//! Any error before commit discards all staged writes. A commit that loses a
//! race is retried from scratch up to `max_conflict_retries` times.

mod cart;
mod catalog;
mod favorites;
mod order;
mod reporting;
mod staff;

use crate::config::ShopConfig;
use crate::error::ServiceError;
use crate::store::{Row, ShopStore, Transaction};

pub use favorites::NEW_PRODUCTS_LIMIT;
pub use staff::EmployeeProfileUpdate;

#[derive(Debug)]
pub struct ShopService<S> {
    store: S,
    config: ShopConfig,
}

impl<S> ShopService<S> {
    pub fn new(store: S, config: ShopConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ShopStore> ShopService<S> {
    /// Run `work` in a fresh transaction and commit it, retrying on conflict.
    fn run<T>(
        &self,
        operation: &'static str,
        mut work: impl FnMut(&mut Transaction<'_, S>) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut attempt = 0u32;
        loop {
            let mut tx = Transaction::begin(&self.store);
            let result = work(&mut tx).and_then(|value| {
                tx.commit()?;
                Ok(value)
            });

            match result {
                Err(err) if err.is_retryable() && attempt < self.config.max_conflict_retries => {
                    attempt += 1;
                    tracing::warn!(operation, attempt, error = %err, "retrying after concurrency conflict");
                }
                other => return other,
            }
        }
    }

    /// Run read-only `work`; nothing is committed.
    fn query<T>(
        &self,
        work: impl FnOnce(&mut Transaction<'_, S>) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut tx = Transaction::begin(&self.store);
        work(&mut tx)
    }
}

/// Load a row that must exist.
fn load<S, T>(tx: &mut Transaction<'_, S>, id: T::Id) -> Result<T, ServiceError>
where
    S: ShopStore + ?Sized,
    T: Row,
{
    tx.get::<T>(id)?.ok_or_else(|| ServiceError::NotFound {
        entity: T::KIND,
        id: id.to_string(),
    })
}
