use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 用户持券表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCoupon {
    pub id: Option<i64>,
    pub user_id: i64,
    pub coupon_id: i64,
    /// 1=未使用 2=已使用 3=已过期
    pub status: i32,
    pub order_id: Option<i64>,
    pub used_at: Option<DateTime>,
    pub create_time: Option<DateTime>,
}

crud!(UserCoupon {}, "user_coupons");
impl_select!(UserCoupon{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(UserCoupon{select_by_user(user_id: i64) => "`where user_id = #{user_id} order by id desc`"});
impl_select!(UserCoupon{select_unused(user_id: i64) => "`where user_id = #{user_id} and status = 1 order by id desc`"});

impl UserCoupon {
    pub const TABLE_NAME: &'static str = "user_coupons";

    pub const STATUS_UNUSED: i32 = 1;
    pub const STATUS_USED: i32 = 2;
    pub const STATUS_EXPIRED: i32 = 3;
}
