use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 访问日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLog {
    pub id: Option<i64>,
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status: i32,
    pub user_id: Option<i64>,
    pub ip: Option<String>,
    pub latency_ms: i64,
    pub create_time: Option<DateTime>,
}

crud!(AccessLog {}, "access_logs");
impl_select!(AccessLog{select_by_request_id(request_id: &str) -> Option => "`where request_id = #{request_id} limit 1`"});

impl AccessLog {
    pub const TABLE_NAME: &'static str = "access_logs";
}
