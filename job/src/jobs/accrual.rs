use common::constants::lock;

use super::{acquire_date_lock, today, JobContext};

/// 每日计息任务
///
/// (user_id, date) 唯一键保证重复执行不重复入账；
/// 单用户失败记录日志后继续。
pub async fn run(ctx: &JobContext) {
    let date = today();
    let cfg = &ctx.config.finance.accrual;
    if !acquire_date_lock(
        &ctx.redis,
        &lock::accrual(&date),
        cfg.lock_ttl_secs,
        cfg.use_redis_lock,
    )
    .await
    {
        return;
    }

    log::info!("计息任务开始: date={}", date);
    match ctx.interest_engine.run_for_date(ctx.rb.as_ref(), &date).await {
        Ok(summary) => log::info!(
            "计息任务完成: date={} accrued={} skipped={} total={}",
            summary.date,
            summary.accrued_users,
            summary.skipped_users,
            summary.total_interest
        ),
        Err(e) => log::error!("计息任务失败: date={} err={}", date, e),
    }
}
