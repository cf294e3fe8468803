//! Redis Key 常量定义
//!
//! 统一管理所有 Redis key，便于维护和查找

/// 权限缓存相关 Key
pub mod perm {
    /// 用户权限集合缓存 (String, JSON 数组)
    pub const USER_PREFIX: &str = "perm:user:";

    /// 全量失效时的匹配模式
    pub const USER_PATTERN: &str = "perm:user:*";

    pub fn user_key(user_id: i64) -> String {
        format!("{}{}", USER_PREFIX, user_id)
    }
}

/// 每日任务分布式锁相关 Key
pub mod lock {
    /// 计息任务锁，按日期区分
    pub fn accrual(date: &str) -> String {
        format!("accrual:lock:{}", date)
    }

    /// 佣金解冻任务锁，按日期区分
    pub fn commission_release(date: &str) -> String {
        format!("commission_release:lock:{}", date)
    }
}

/// 消息主题
pub mod topic {
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_PAID: &str = "order.paid";
    pub const ORDER_REFUNDED: &str = "order.refunded";
}
