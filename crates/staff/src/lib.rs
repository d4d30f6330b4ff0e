//! User directory records and employee profiles.

pub mod employee;
pub mod user;

pub use employee::{EmployeeProfile, WorkingSchedule};
pub use user::{NewUser, User};
