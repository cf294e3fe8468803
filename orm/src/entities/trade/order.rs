use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 订单表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<i64>,
    pub order_no: String,
    pub user_id: i64,
    /// 0 表示商城订单，非 0 为门店订单
    pub store_id: i64,
    /// 1=配送 2=自提/堂食
    pub order_type: i32,
    /// 1=待支付 2=已支付 3=配送中 4=已完成 5=已取消 6=退款中 7=已退款
    pub status: i32,
    /// 1=未支付 2=已支付 3=已退款
    pub pay_status: i32,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub pay_amount: Decimal,
    /// 下单时冻结的分享人，生命周期内不变
    pub referrer_id: Option<i64>,
    pub share_store_id: Option<i64>,
    pub user_coupon_id: Option<i64>,
    pub remark: Option<String>,
    pub cancel_reason: Option<String>,
    pub paid_at: Option<DateTime>,
    pub completed_at: Option<DateTime>,
    pub cancelled_at: Option<DateTime>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(Order {}, "orders");
impl_select!(Order{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Order{select_by_order_no(order_no: &str) -> Option => "`where order_no = #{order_no} limit 1`"});
impl_select!(Order{select_by_user(user_id: i64, page_offset: u64, page_size: u64) => "`where user_id = #{user_id} order by id desc limit #{page_offset}, #{page_size}`"});
impl_select!(Order{select_by_user_status(user_id: i64, status: i32, page_offset: u64, page_size: u64) => "`where user_id = #{user_id} and status = #{status} order by id desc limit #{page_offset}, #{page_size}`"});
impl_select!(Order{select_by_store(store_id: i64, page_offset: u64, page_size: u64) => "`where store_id = #{store_id} order by id desc limit #{page_offset}, #{page_size}`"});

impl Order {
    pub const TABLE_NAME: &'static str = "orders";

    pub const TYPE_DELIVERY: i32 = 1;
    pub const TYPE_DINE_IN: i32 = 2;

    pub const STATUS_PENDING: i32 = 1;
    pub const STATUS_PAID: i32 = 2;
    pub const STATUS_SHIPPING: i32 = 3;
    pub const STATUS_COMPLETED: i32 = 4;
    pub const STATUS_CANCELLED: i32 = 5;
    pub const STATUS_REFUNDING: i32 = 6;
    pub const STATUS_REFUNDED: i32 = 7;

    pub const PAY_UNPAID: i32 = 1;
    pub const PAY_PAID: i32 = 2;
    pub const PAY_REFUNDED: i32 = 3;
}
