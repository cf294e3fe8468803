use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 佣金流水表
///
/// 订单支付成功后按冻结态入账，冻结期满由释放任务转可用；
/// 订单退款时对未提现部分整单冲正。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commission {
    pub id: Option<i64>,
    pub order_id: i64,
    /// 收益人
    pub user_id: i64,
    /// 产生收益的下单用户
    pub source_user_id: i64,
    /// direct / team / adjust
    pub commission_type: String,
    pub amount: Decimal,
    /// frozen / available / withdrawn / reversed
    pub status: String,
    pub freeze_until: Option<DateTime>,
    pub withdraw_id: Option<i64>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(Commission {}, "commissions");
impl_select!(Commission{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Commission{select_by_order_id(order_id: i64) => "`where order_id = #{order_id} order by id`"});
impl_select!(Commission{select_by_user(user_id: i64, page_offset: u64, page_size: u64) => "`where user_id = #{user_id} order by id desc limit #{page_offset}, #{page_size}`"});
impl_select!(Commission{select_available(user_id: i64) => "`where user_id = #{user_id} and status = 'available' order by id`"});

impl Commission {
    pub const TABLE_NAME: &'static str = "commissions";

    pub const TYPE_DIRECT: &'static str = "direct";
    pub const TYPE_TEAM: &'static str = "team";
    pub const TYPE_ADJUST: &'static str = "adjust";

    pub const STATUS_FROZEN: &'static str = "frozen";
    pub const STATUS_AVAILABLE: &'static str = "available";
    pub const STATUS_WITHDRAWN: &'static str = "withdrawn";
    pub const STATUS_REVERSED: &'static str = "reversed";
}
