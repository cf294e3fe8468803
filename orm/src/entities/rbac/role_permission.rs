use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 角色-权限关联表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermission {
    pub id: Option<i64>,
    pub role_id: i64,
    pub permission_id: i64,
}

crud!(RolePermission {}, "role_permissions");
impl_select!(RolePermission{select_by_role_id(role_id: i64) => "`where role_id = #{role_id}`"});
impl_select!(RolePermission{select_one(role_id: i64, permission_id: i64) -> Option => "`where role_id = #{role_id} and permission_id = #{permission_id} limit 1`"});

impl RolePermission {
    pub const TABLE_NAME: &'static str = "role_permissions";
}
