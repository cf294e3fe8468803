use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 推荐关系闭包表
///
/// 每个用户带一条 depth=0 的自身行；depth=1 为直接上级。
/// 重新绑定采用最后点击生效：删除 depth=1 的旧行后插入新行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralClosure {
    pub id: Option<i64>,
    pub ancestor_user_id: i64,
    pub descendant_user_id: i64,
    pub depth: i32,
    pub create_time: Option<DateTime>,
}

crud!(ReferralClosure {}, "referral_closure");
impl_select!(ReferralClosure{select_ancestors(descendant_user_id: i64) => "`where descendant_user_id = #{descendant_user_id} and depth > 0 order by depth`"});
impl_select!(ReferralClosure{select_direct_referrer(descendant_user_id: i64) -> Option => "`where descendant_user_id = #{descendant_user_id} and depth = 1 limit 1`"});
impl_select!(ReferralClosure{select_one(ancestor_user_id: i64, descendant_user_id: i64) -> Option => "`where ancestor_user_id = #{ancestor_user_id} and descendant_user_id = #{descendant_user_id} limit 1`"});

impl ReferralClosure {
    pub const TABLE_NAME: &'static str = "referral_closure";
}
