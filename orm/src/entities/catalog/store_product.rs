use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 门店商品绑定表
///
/// 绑定存在时覆盖商品价格，并作为该门店的权威库存计数器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreProduct {
    pub id: Option<i64>,
    pub store_id: i64,
    pub product_id: i64,
    pub stock: i64,
    pub price_override: Option<Decimal>,
    /// 1=常规 2=季节限定 3=门店专供（不可与平台商品混合下单）
    pub biz_type: i32,
}

crud!(StoreProduct {}, "store_products");
impl_select!(StoreProduct{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(StoreProduct{select_one(store_id: i64, product_id: i64) -> Option => "`where store_id = #{store_id} and product_id = #{product_id} limit 1`"});
impl_select!(StoreProduct{select_by_store(store_id: i64) => "`where store_id = #{store_id} order by id`"});

impl StoreProduct {
    pub const TABLE_NAME: &'static str = "store_products";

    pub const BIZ_REGULAR: i32 = 1;
    pub const BIZ_SEASONAL: i32 = 2;
    pub const BIZ_STORE_EXCLUSIVE: i32 = 3;
}
