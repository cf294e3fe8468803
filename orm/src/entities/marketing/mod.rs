pub mod coupon;
pub mod user_coupon;

pub use coupon::Coupon;
pub use user_coupon::UserCoupon;
