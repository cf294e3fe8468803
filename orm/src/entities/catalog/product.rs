use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 商品表（平台维度价格与库存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub category_id: Option<i64>,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    /// 1=上架 2=下架
    pub status: i32,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(Product {}, "products");
impl_select!(Product{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Product{select_on_sale(page_offset: u64, page_size: u64) => "`where status = 1 order by id desc limit #{page_offset}, #{page_size}`"});

impl Product {
    pub const TABLE_NAME: &'static str = "products";

    pub const STATUS_ON_SALE: i32 = 1;
    pub const STATUS_OFF_SALE: i32 = 2;
}
