use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 每日计息记录（(user_id, date) 唯一，天然幂等）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRecord {
    pub id: Option<i64>,
    pub user_id: i64,
    /// yyyy-mm-dd
    pub date: String,
    pub principal_before: Decimal,
    pub rate: Decimal,
    pub interest_amount: Decimal,
    pub principal_after: Decimal,
    pub create_time: Option<DateTime>,
}

crud!(InterestRecord {}, "interest_records");
impl_select!(InterestRecord{select_one(user_id: i64, date: &str) -> Option => "`where user_id = #{user_id} and date = #{date} limit 1`"});
impl_select!(InterestRecord{select_by_user(user_id: i64, page_offset: u64, page_size: u64) => "`where user_id = #{user_id} order by id desc limit #{page_offset}, #{page_size}`"});

impl InterestRecord {
    pub const TABLE_NAME: &'static str = "interest_records";
}
