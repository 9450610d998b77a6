//! Shared domain types.
//!
//! Newtype wrappers and enums used across the storefront and CLI crates.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::{OrderStatus, Role, SessionAction};
