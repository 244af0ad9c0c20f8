pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod collections;
pub mod customers;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod reviews;
