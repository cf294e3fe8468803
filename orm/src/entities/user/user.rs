use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 用户表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub open_id: Option<String>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    /// 基础角色：user / store / admin
    pub role: Option<String>,
    /// 1=正常 2=禁用
    pub status: Option<i32>,
    pub blacklist: Option<bool>,
    /// 白名单优先于黑名单与禁用状态
    pub whitelist: Option<bool>,
    pub balance: Option<Decimal>,
    /// 个人定制日利率，覆盖全局配置
    pub interest_rate: Option<Decimal>,
    pub partner_level_id: Option<i64>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(User {}, "users");
impl_select!(User{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(User{select_by_open_id(open_id: &str) -> Option => "`where open_id = #{open_id} limit 1`"});
impl_select!(User{select_active_with_balance() => "`where status = 1 and balance > 0 order by id`"});

impl User {
    pub const TABLE_NAME: &'static str = "users";

    pub const STATUS_ACTIVE: i32 = 1;
    pub const STATUS_DISABLED: i32 = 2;

    pub const ROLE_ADMIN: &'static str = "admin";
    pub const ROLE_STORE: &'static str = "store";
    pub const ROLE_USER: &'static str = "user";
}
