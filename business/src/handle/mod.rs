// HTTP 接口层：按领域拆分，路径统一挂在 /api/v1 下

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod finance_admin;
pub mod order;
pub mod payment;
pub mod rbac;
pub mod referral;
pub mod store;
pub mod user;
pub mod withdraw;
