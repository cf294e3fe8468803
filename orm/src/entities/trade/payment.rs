use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 支付单（回调幂等以 payment_no 为锚点）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<i64>,
    pub payment_no: String,
    pub order_id: i64,
    pub amount: Decimal,
    pub method: Option<String>,
    /// 1=待支付 2=成功 3=失败
    pub trade_state: i32,
    pub external_txn_id: Option<String>,
    pub signature_verified: Option<i32>,
    pub third_response: Option<String>,
    pub notify_at: Option<DateTime>,
    pub paid_at: Option<DateTime>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(Payment {}, "payments");
impl_select!(Payment{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Payment{select_by_payment_no(payment_no: &str) -> Option => "`where payment_no = #{payment_no} limit 1`"});
impl_select!(Payment{select_by_order_id(order_id: i64) => "`where order_id = #{order_id} order by id desc`"});

impl Payment {
    pub const TABLE_NAME: &'static str = "payments";

    pub const STATE_PENDING: i32 = 1;
    pub const STATE_SUCCESS: i32 = 2;
    pub const STATE_FAILED: i32 = 3;
}
