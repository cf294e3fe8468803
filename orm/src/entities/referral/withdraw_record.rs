use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 提现记录表（金额与手续费均为分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRecord {
    pub id: Option<i64>,
    pub withdraw_no: String,
    pub user_id: i64,
    pub store_id: Option<i64>,
    pub amount_cents: i64,
    pub fee_cents: i64,
    /// 1=待审核 2=已通过 3=已打款 4=已驳回
    pub state: i32,
    pub remark: Option<String>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(WithdrawRecord {}, "withdraw_records");
impl_select!(WithdrawRecord{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(WithdrawRecord{select_by_user(user_id: i64, page_offset: u64, page_size: u64) => "`where user_id = #{user_id} order by id desc limit #{page_offset}, #{page_size}`"});
impl_select!(WithdrawRecord{select_by_state(state: i32, page_offset: u64, page_size: u64) => "`where state = #{state} order by id desc limit #{page_offset}, #{page_size}`"});

impl WithdrawRecord {
    pub const TABLE_NAME: &'static str = "withdraw_records";

    pub const STATE_PENDING: i32 = 1;
    pub const STATE_APPROVED: i32 = 2;
    pub const STATE_COMPLETED: i32 = 3;
    pub const STATE_REJECTED: i32 = 4;
}
