use std::sync::Arc;

use rbatis::RBatis;
use tokio_cron_scheduler::{Job, JobScheduler};

use common::{AppConfig, RedisUtil};
use finance::{CommissionEngine, InterestEngine};

mod jobs;

use jobs::JobContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 嵌入配置文件（编译时加载）
    const DEFAULT_CONFIG: &str = include_str!("../config.yaml");

    let config = AppConfig::from_file_or_embedded("job/config", DEFAULT_CONFIG)?;

    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动定时任务服务...");

    let rb = RBatis::new();
    rb.link(rbdc_mysql::MysqlDriver {}, &config.database.url)
        .await?;
    log::info!("数据库连接成功");

    let redis = Arc::new(RedisUtil::from_url(config.redis.url.clone())?);
    let config = Arc::new(config);

    let ctx = JobContext {
        config: config.clone(),
        rb: Arc::new(rb),
        redis,
        interest_engine: Arc::new(InterestEngine::new(config.finance.accrual.clone())),
        commission_engine: Arc::new(CommissionEngine::new(config.finance.partner.clone())),
    };

    let scheduler = JobScheduler::new().await?;

    if config.finance.accrual.enabled {
        let cron = jobs::cron_of(&config.finance.accrual.time)
            .ok_or_else(|| format!("无效的计息时刻: {}", config.finance.accrual.time))?;
        let job_ctx = ctx.clone();
        scheduler
            .add(Job::new_async(cron.as_str(), move |_id, _lock| {
                let ctx = job_ctx.clone();
                Box::pin(async move {
                    jobs::accrual::run(&ctx).await;
                })
            })?)
            .await?;
        log::info!("计息任务已注册: {}", cron);
    }

    if config.finance.commission_release.enabled {
        let cron = jobs::cron_of(&config.finance.commission_release.time).ok_or_else(|| {
            format!(
                "无效的佣金解冻时刻: {}",
                config.finance.commission_release.time
            )
        })?;
        let job_ctx = ctx.clone();
        scheduler
            .add(Job::new_async(cron.as_str(), move |_id, _lock| {
                let ctx = job_ctx.clone();
                Box::pin(async move {
                    jobs::commission_release::run(&ctx).await;
                })
            })?)
            .await?;
        log::info!("佣金解冻任务已注册: {}", cron);
    }

    scheduler.start().await?;
    log::info!("调度器已启动，按 Ctrl+C 退出");
    tokio::signal::ctrl_c().await?;
    log::info!("收到退出信号，正在关闭调度器...");
    Ok(())
}
