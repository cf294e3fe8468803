use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 优惠券模板表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Option<i64>,
    pub name: String,
    /// 1=满减 2=立减 3=折扣（amount 为折扣百分比）
    pub coupon_type: i32,
    pub amount: Decimal,
    /// 满减门槛，立减与折扣为 0
    pub min_amount: Decimal,
    pub start_time: Option<DateTime>,
    pub end_time: Option<DateTime>,
    /// 0=平台券 非 0=仅限该门店
    pub store_id: i64,
    /// 1=启用 2=停用
    pub status: i32,
    pub total_count: Option<i32>,
    pub used_count: Option<i32>,
    pub create_time: Option<DateTime>,
}

crud!(Coupon {}, "coupons");
impl_select!(Coupon{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Coupon{select_enabled() => "`where status = 1 order by id desc`"});

impl Coupon {
    pub const TABLE_NAME: &'static str = "coupons";

    pub const TYPE_THRESHOLD: i32 = 1;
    pub const TYPE_FIXED: i32 = 2;
    pub const TYPE_PERCENTAGE: i32 = 3;

    pub const STATUS_ENABLED: i32 = 1;
    pub const STATUS_DISABLED: i32 = 2;
}
