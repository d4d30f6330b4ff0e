//! Infrastructure layer: transactional storage, configuration and the
//! service operations exposed to the HTTP/permission layer.

pub mod config;
pub mod error;
pub mod service;
pub mod store;


pub use config::ShopConfig;
pub use error::ServiceError;
pub use service::{EmployeeProfileUpdate, ShopService};
pub use store::{InMemoryShopStore, ShopStore, StoreError, Transaction};
