use common::config::AccrualConfig;
use common::utils::money;
use common::{AppError, AppResult};
use log::{info, warn};
use orm::entities::finance::InterestRecord;
use orm::entities::user::User;
use rbatis::executor::Executor;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 每日计息引擎
///
/// (user_id, date) 唯一键保证重复执行幂等；单个用户失败只记日志不中断。
pub struct InterestEngine {
    cfg: AccrualConfig,
}

/// 单日计息汇总
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AccrualSummary {
    pub date: String,
    pub accrued_users: u64,
    pub skipped_users: u64,
    pub total_interest: Decimal,
}

impl InterestEngine {
    pub fn new(cfg: AccrualConfig) -> Self {
        Self { cfg }
    }

    fn default_rate(&self) -> AppResult<Decimal> {
        Decimal::from_str(&self.cfg.rate)
            .map_err(|_| AppError::internal(format!("无效的日利率配置: {}", self.cfg.rate)))
    }

    /// 计算单笔利息，落库边界银行家舍入
    pub fn interest_amount(principal: Decimal, rate: Decimal) -> Decimal {
        money::round2(principal * rate)
    }

    /// 对余额为正的活跃用户逐一计息
    pub async fn run_for_date(&self, rb: &RBatis, date: &str) -> AppResult<AccrualSummary> {
        let default_rate = self.default_rate()?;
        let users = User::select_active_with_balance(rb).await?;

        let mut summary = AccrualSummary {
            date: date.to_string(),
            ..AccrualSummary::default()
        };
        for user in users {
            match self.accrue_one(rb, &user, date, default_rate).await {
                Ok(Some(amount)) => {
                    summary.accrued_users += 1;
                    summary.total_interest += amount;
                }
                Ok(None) => summary.skipped_users += 1,
                Err(e) => {
                    warn!("用户 {:?} 计息失败: {}", user.id, e);
                    summary.skipped_users += 1;
                }
            }
        }

        info!(
            "计息完成: date={} accrued={} skipped={} total={}",
            summary.date, summary.accrued_users, summary.skipped_users, summary.total_interest
        );
        Ok(summary)
    }

    async fn accrue_one(
        &self,
        rb: &RBatis,
        user: &User,
        date: &str,
        default_rate: Decimal,
    ) -> AppResult<Option<Decimal>> {
        let user_id = user
            .id
            .ok_or_else(|| AppError::internal("用户缺少主键"))?;

        if InterestRecord::select_one(rb, user_id, date).await?.is_some() {
            return Ok(None);
        }

        let principal = user.balance.unwrap_or(Decimal::ZERO);
        let rate = user.interest_rate.unwrap_or(default_rate);
        let interest = Self::interest_amount(principal, rate);
        if interest <= Decimal::ZERO {
            return Ok(None);
        }

        let mut tx = rb.acquire_begin().await?.defer_async(|mut tx| async move {
            if !tx.done() {
                let _ = tx.rollback().await;
            }
        });

        let record = InterestRecord {
            id: None,
            user_id,
            date: date.to_string(),
            principal_before: principal,
            rate,
            interest_amount: interest,
            principal_after: principal + interest,
            create_time: Some(DateTime::now()),
        };
        InterestRecord::insert(&tx, &record).await?;
        tx.exec(
            "update users set balance = balance + ?, update_time = now() where id = ?",
            vec![rbs::value!(interest), rbs::value!(user_id)],
        )
        .await?;
        tx.commit().await?;

        Ok(Some(interest))
    }

    /// 某日计息汇总（管理端查询）
    pub async fn summary_for_date(&self, rb: &RBatis, date: &str) -> AppResult<AccrualSummary> {
        #[derive(Deserialize)]
        struct Row {
            accrued_users: u64,
            total_interest: Decimal,
        }
        let row: Row = rb
            .query_decode(
                "select count(*) as accrued_users, \
                 coalesce(sum(interest_amount), 0) as total_interest \
                 from interest_records where date = ?",
                vec![rbs::value!(date)],
            )
            .await?;
        Ok(AccrualSummary {
            date: date.to_string(),
            accrued_users: row.accrued_users,
            skipped_users: 0,
            total_interest: row.total_interest,
        })
    }

    /// 某日计息明细（管理端导出）
    pub async fn records_for_date(&self, rb: &RBatis, date: &str) -> AppResult<Vec<InterestRecord>> {
        let rows: Vec<InterestRecord> = rb
            .query_decode(
                "select * from interest_records where date = ? order by user_id",
                vec![rbs::value!(date)],
            )
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_amount_rounds_to_cents() {
        let principal = Decimal::from_str("1000.00").unwrap();
        let rate = Decimal::from_str("0.001").unwrap();
        assert_eq!(
            InterestEngine::interest_amount(principal, rate).to_string(),
            "1.00"
        );

        // 12.5 * 0.001 = 0.0125 中点取偶 -> 0.01
        let principal = Decimal::from_str("12.50").unwrap();
        assert_eq!(
            InterestEngine::interest_amount(principal, rate).to_string(),
            "0.01"
        );
    }

    #[test]
    fn default_rate_rejects_garbage() {
        let engine = InterestEngine::new(AccrualConfig {
            rate: "not-a-number".to_string(),
            ..AccrualConfig::default()
        });
        assert!(engine.default_rate().is_err());
    }
}
