// 业务服务层

pub mod cart_service;
pub mod coupon_service;
pub mod order_service;
pub mod payment_service;
pub mod perm_service;
pub mod rbac_service;
pub mod referral_service;
pub mod store_scope;
