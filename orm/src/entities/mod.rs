pub mod catalog;
pub mod finance;
pub mod log;
pub mod marketing;
pub mod rbac;
pub mod referral;
pub mod trade;
pub mod user;
