use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 商品分类表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub sort: Option<i32>,
    pub status: Option<i32>,
}

crud!(Category {}, "categories");
impl_select!(Category{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Category{select_enabled() => "`where status = 1 order by sort, id`"});

impl Category {
    pub const TABLE_NAME: &'static str = "categories";
}
