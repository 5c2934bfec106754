pub mod account;
pub mod affiliates;
pub mod events;
pub mod finance;
pub mod products;
pub mod sales;
pub mod webhooks;
