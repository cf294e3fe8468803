use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 合伙人等级表（命中时覆盖全局默认比例）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerLevel {
    pub id: Option<i64>,
    pub name: String,
    pub direct_rate: Decimal,
    pub team_rate: Decimal,
}

crud!(PartnerLevel {}, "partner_levels");
impl_select!(PartnerLevel{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});

impl PartnerLevel {
    pub const TABLE_NAME: &'static str = "partner_levels";
}
