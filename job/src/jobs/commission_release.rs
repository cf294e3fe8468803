use common::constants::lock;

use super::{acquire_date_lock, today, JobContext};

/// 每日佣金解冻任务
///
/// 先冲正死单佣金再放量转可用，分批扫描直到无到期行。
pub async fn run(ctx: &JobContext) {
    let date = today();
    let cfg = &ctx.config.finance.commission_release;
    if !acquire_date_lock(
        &ctx.redis,
        &lock::commission_release(&date),
        cfg.lock_ttl_secs,
        cfg.use_redis_lock,
    )
    .await
    {
        return;
    }

    log::info!("佣金解冻任务开始: date={}", date);
    match ctx
        .commission_engine
        .release_due(ctx.rb.as_ref(), cfg.batch_size)
        .await
    {
        Ok(summary) => log::info!(
            "佣金解冻任务完成: date={} released={} reversed={}",
            date,
            summary.released,
            summary.reversed
        ),
        Err(e) => log::error!("佣金解冻任务失败: date={} err={}", date, e),
    }
}
