pub mod jwt;
pub mod money;
pub mod serial;
pub mod sign;
pub mod snowflake;
