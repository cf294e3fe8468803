// 资金域
// 佣金账本、每日计息、提现，API 服务与定时任务共用

pub mod commission;
pub mod interest;
pub mod rates;
pub mod withdraw;

pub use commission::CommissionEngine;
pub use interest::InterestEngine;
pub use withdraw::WithdrawEngine;
