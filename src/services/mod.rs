pub mod address_service;
pub mod auth_service;
pub mod cart_service;
pub mod checkout_service;
pub mod collection_service;
pub mod customer_service;
pub mod order_service;
pub mod product_service;
pub mod promotion_service;
pub mod reconciliation_service;
pub mod review_service;
