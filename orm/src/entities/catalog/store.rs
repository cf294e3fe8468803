use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 门店表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Option<i64>,
    pub name: String,
    pub address: Option<String>,
    /// 1=营业 2=停业
    pub status: i32,
}

crud!(Store {}, "stores");
impl_select!(Store{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Store{select_open() => "`where status = 1 order by id`"});

impl Store {
    pub const TABLE_NAME: &'static str = "stores";

    pub const STATUS_OPEN: i32 = 1;
}
