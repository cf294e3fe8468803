pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod refund;

pub use cart::Cart;
pub use cart_item::CartItem;
pub use order::Order;
pub use order_item::OrderItem;
pub use payment::Payment;
pub use refund::Refund;
