pub mod addresses;
pub mod cart_items;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod reviews;
pub mod users;

pub use addresses::Entity as Addresses;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use collections::Entity as Collections;
pub use customers::Entity as Customers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use promotions::Entity as Promotions;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
