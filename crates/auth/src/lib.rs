//! `bloomshop-auth`: role-based authorization boundary.
//!
//! Identity is established elsewhere (token issuance is not part of this
//! workspace). This crate turns an already-authenticated requester into a
//! capability object once per request; domain services ask that object,
//! never the raw role.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, Actor, AuthzError, Capabilities};
pub use permissions::Permission;
pub use principal::{Principal, Requester};
pub use roles::Role;
