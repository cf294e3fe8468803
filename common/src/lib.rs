// 公共模块
// 提供配置、错误处理、统一响应、Redis、日志、签名等通用功能

pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod mq;
pub mod redis;
pub mod response;
pub mod utils;

// 重新导出常用类型和函数
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use logger::init_logger;
pub use redis::RedisUtil;
