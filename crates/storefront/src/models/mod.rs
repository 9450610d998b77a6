//! Domain models for storefront.
//!
//! These types represent validated domain objects separate from database
//! row types. The cart aggregate lives in [`crate::cart`].

pub mod order;
pub mod product;
pub mod session;
pub mod session_log;
pub mod user;

pub use order::{CustomerInfo, Order, OrderItem, OrderReceipt, OrderWithItems};
pub use product::{Product, ProductInput};
pub use session::{CurrentUser, session_keys};
pub use session_log::SessionLogEntry;
pub use user::User;
