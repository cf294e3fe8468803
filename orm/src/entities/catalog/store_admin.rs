use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 门店管理员映射表（店员账号的门店作用域）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreAdmin {
    pub id: Option<i64>,
    pub user_id: i64,
    pub store_id: i64,
}

crud!(StoreAdmin {}, "store_admins");
impl_select!(StoreAdmin{select_by_user_id(user_id: i64) -> Option => "`where user_id = #{user_id} order by id desc limit 1`"});

impl StoreAdmin {
    pub const TABLE_NAME: &'static str = "store_admins";
}
