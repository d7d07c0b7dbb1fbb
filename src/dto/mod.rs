pub mod auth;
pub mod cart;
pub mod content;
pub mod enquiries;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
