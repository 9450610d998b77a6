//! Application services.
//!
//! - [`oauth`] - OAuth sign-in client (authorization URL, code exchange,
//!   userinfo)
//! - [`orders`] - The order writer: cart snapshot to immutable order

pub mod oauth;
pub mod orders;
