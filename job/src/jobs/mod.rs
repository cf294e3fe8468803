use std::sync::Arc;

use common::{AppConfig, RedisUtil};
use finance::{CommissionEngine, InterestEngine};
use rbatis::RBatis;

pub mod accrual;
pub mod commission_release;

/// 任务共享依赖
#[derive(Clone)]
pub struct JobContext {
    pub config: Arc<AppConfig>,
    pub rb: Arc<RBatis>,
    pub redis: Arc<RedisUtil>,
    pub interest_engine: Arc<InterestEngine>,
    pub commission_engine: Arc<CommissionEngine>,
}

/// 当日业务日期（本地时区）
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// "HH:MM" 转六段 cron 表达式（秒 分 时 日 月 周）
pub fn cron_of(time: &str) -> Option<String> {
    let (hour, minute) = time.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("0 {} {} * * *", minute, hour))
}

/// 日期锁：拿到返回 true；锁被占返回 false；
/// Redis 不可用时告警后放行，幂等约束兜底。
pub async fn acquire_date_lock(
    redis: &RedisUtil,
    key: &str,
    ttl_secs: u64,
    use_lock: bool,
) -> bool {
    if !use_lock {
        return true;
    }
    match redis.set_nx_ex(key, "1", ttl_secs).await {
        Ok(acquired) => {
            if !acquired {
                log::info!("锁已被占用，跳过本次执行: {}", key);
            }
            acquired
        }
        Err(e) => {
            log::warn!("获取锁失败，降级为无锁执行: {} ({})", key, e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cron_expression_from_clock_time() {
        assert_eq!(cron_of("02:00").unwrap(), "0 0 2 * * *");
        assert_eq!(cron_of("23:59").unwrap(), "0 59 23 * * *");
        assert!(cron_of("24:00").is_none());
        assert!(cron_of("0200").is_none());
    }
}
