use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 权限表
///
/// name 为小写冒号分隔的 `<module>:<action>` 形式，如 `accrual:run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Option<i64>,
    pub name: String,
    pub display_name: Option<String>,
    pub module: Option<String>,
    pub action: Option<String>,
    pub create_time: Option<DateTime>,
}

crud!(Permission {}, "permissions");
impl_select!(Permission{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(Permission{select_by_name(name: &str) -> Option => "`where name = #{name} limit 1`"});

impl Permission {
    pub const TABLE_NAME: &'static str = "permissions";
}
