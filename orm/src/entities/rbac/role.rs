use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 角色表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Option<i64>,
    pub name: String,
    pub display_name: Option<String>,
    pub create_time: Option<DateTime>,
}

crud!(Role {}, "roles");
impl_select!(Role{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Role{select_by_name(name: &str) -> Option => "`where name = #{name} limit 1`"});

impl Role {
    pub const TABLE_NAME: &'static str = "roles";
}
