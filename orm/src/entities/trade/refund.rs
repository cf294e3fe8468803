use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 退款单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: Option<i64>,
    pub refund_no: String,
    pub order_id: i64,
    pub payment_id: i64,
    pub amount: Decimal,
    /// 1=处理中 2=成功 3=失败
    pub state: i32,
    pub reason: Option<String>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(Refund {}, "refunds");
impl_select!(Refund{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Refund{select_by_order_id(order_id: i64) => "`where order_id = #{order_id} order by id desc`"});

impl Refund {
    pub const TABLE_NAME: &'static str = "refunds";

    pub const STATE_PROCESSING: i32 = 1;
    pub const STATE_SUCCESS: i32 = 2;
    pub const STATE_FAILED: i32 = 3;
}
