pub mod auth;
pub mod cart;
pub mod checkout;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod fetch;
pub mod models;
pub mod money;
pub mod response;
pub mod services;
pub mod storage;
pub mod util;
