use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 用户-角色关联表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub id: Option<i64>,
    pub user_id: i64,
    pub role_id: i64,
}

crud!(UserRole {}, "user_roles");
impl_select!(UserRole{select_by_user_id(user_id: i64) => "`where user_id = #{user_id}`"});
impl_select!(UserRole{select_by_role_id(role_id: i64) => "`where role_id = #{role_id}`"});
impl_select!(UserRole{select_one(user_id: i64, role_id: i64) -> Option => "`where user_id = #{user_id} and role_id = #{role_id} limit 1`"});

impl UserRole {
    pub const TABLE_NAME: &'static str = "user_roles";
}
