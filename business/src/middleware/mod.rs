// 请求管道
// 注册顺序（外层到内层）：请求ID/恐慌恢复 -> 访问日志 -> CORS -> 认证 -> 操作日志 -> 限流

pub mod access_log;
pub mod auth;
pub mod operation_log;
pub mod rate_limit;
pub mod request_id;
