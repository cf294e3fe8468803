pub mod category;
pub mod product;
pub mod store;
pub mod store_admin;
pub mod store_product;

pub use category::Category;
pub use product::Product;
pub use store::Store;
pub use store_admin::StoreAdmin;
pub use store_product::StoreProduct;
