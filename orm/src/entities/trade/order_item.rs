use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 订单明细（下单时商品名称与单价的快照）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Option<i64>,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

crud!(OrderItem {}, "order_items");
impl_select!(OrderItem{select_by_order_id(order_id: i64) => "`where order_id = #{order_id} order by id`"});

impl OrderItem {
    pub const TABLE_NAME: &'static str = "order_items";
}
