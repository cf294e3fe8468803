use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 购物车（每用户一条）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Option<i64>,
    pub user_id: i64,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(Cart {}, "carts");
impl_select!(Cart{select_by_user_id(user_id: i64) -> Option => "`where user_id = #{user_id} limit 1`"});

impl Cart {
    pub const TABLE_NAME: &'static str = "carts";
}
