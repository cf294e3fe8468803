use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 操作日志（敏感模块的写操作审计，先落库再返回响应）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    pub id: Option<i64>,
    pub request_id: String,
    pub user_id: Option<i64>,
    /// rbac / finance / admin
    pub module: String,
    pub method: String,
    pub path: String,
    pub body: Option<String>,
    pub status: i32,
    pub create_time: Option<DateTime>,
}

crud!(OperationLog {}, "operation_logs");
impl_select!(OperationLog{select_by_user(user_id: i64, page_offset: u64, page_size: u64) => "`where user_id = #{user_id} order by id desc limit #{page_offset}, #{page_size}`"});

impl OperationLog {
    pub const TABLE_NAME: &'static str = "operation_logs";

    pub const MODULE_RBAC: &'static str = "rbac";
    pub const MODULE_FINANCE: &'static str = "finance";
    pub const MODULE_ADMIN: &'static str = "admin";
}
