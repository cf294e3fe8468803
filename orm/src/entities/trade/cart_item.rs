use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 购物车明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Option<i64>,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// 1=勾选 0=未勾选，下单只取勾选项
    pub selected: i32,
}

crud!(CartItem {}, "cart_items");
impl_select!(CartItem{select_by_cart_id(cart_id: i64) => "`where cart_id = #{cart_id} order by id`"});
impl_select!(CartItem{select_selected(cart_id: i64) => "`where cart_id = #{cart_id} and selected = 1 order by id`"});
impl_select!(CartItem{select_one(cart_id: i64, product_id: i64) -> Option => "`where cart_id = #{cart_id} and product_id = #{product_id} limit 1`"});

impl CartItem {
    pub const TABLE_NAME: &'static str = "cart_items";

    pub const SELECTED: i32 = 1;
    pub const UNSELECTED: i32 = 0;
}
