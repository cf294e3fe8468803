use common::config::WithdrawalConfig;
use common::utils::{money, serial};
use common::{AppError, AppResult};
use log::info;
use orm::entities::referral::{Commission, WithdrawRecord};
use rbatis::executor::Executor;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use serde::Serialize;

/// 提现引擎
///
/// 申请时原子锁定可用佣金行，审核流转由运营操作驱动，
/// 驳回时整体解锁回可用。
pub struct WithdrawEngine {
    cfg: WithdrawalConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawApplied {
    pub withdraw_id: i64,
    pub withdraw_no: String,
    pub amount_cents: i64,
    pub fee_cents: i64,
}

/// 手续费 = max(fee_min, min(fee_cap, fee_fixed + amount × rate_bp / 10000))，单位分
pub fn calc_fee_cents(cfg: &WithdrawalConfig, amount_cents: i64) -> i64 {
    let variable = cfg.fee_fixed_cents + amount_cents * cfg.fee_rate_bp / 10_000;
    variable.min(cfg.fee_cap_cents).max(cfg.fee_min_cents)
}

impl WithdrawEngine {
    pub fn new(cfg: WithdrawalConfig) -> Self {
        Self { cfg }
    }

    /// 申请提现
    ///
    /// 行锁下按入账顺序累计锁定可用佣金（含负向调整行），
    /// 累计覆盖申请金额即止；可用总额不足时拒绝。
    pub async fn apply(
        &self,
        rb: &RBatis,
        user_id: i64,
        store_id: Option<i64>,
        amount_cents: i64,
    ) -> AppResult<WithdrawApplied> {
        if amount_cents < self.cfg.min_amount_cents {
            return Err(AppError::invalid_param(format!(
                "提现金额低于最低限额 {} 分",
                self.cfg.min_amount_cents
            )));
        }
        let fee_cents = calc_fee_cents(&self.cfg, amount_cents);
        if fee_cents >= amount_cents {
            return Err(AppError::invalid_param("提现金额不足以覆盖手续费"));
        }

        let mut tx = rb.acquire_begin().await?.defer_async(|mut tx| async move {
            if !tx.done() {
                let _ = tx.rollback().await;
            }
        });

        let value = tx
            .query(
                "select * from commissions \
                 where user_id = ? and status = 'available' order by id for update",
                vec![rbs::value!(user_id)],
            )
            .await?;
        let available: Vec<Commission> = rbatis::decode(value)?;

        let total_cents: i64 = available.iter().map(|c| money::to_cents(c.amount)).sum();
        if total_cents < amount_cents {
            return Err(AppError::conflict("可提现余额不足"));
        }

        let now = DateTime::now();
        let record = WithdrawRecord {
            id: None,
            withdraw_no: serial::withdraw_no(),
            user_id,
            store_id,
            amount_cents,
            fee_cents,
            state: WithdrawRecord::STATE_PENDING,
            remark: None,
            create_time: Some(now.clone()),
            update_time: Some(now),
        };
        let res = WithdrawRecord::insert(&tx, &record).await?;
        let withdraw_id = res
            .last_insert_id
            .as_i64()
            .ok_or_else(|| AppError::internal("提现单主键生成失败"))?;

        // 按入账顺序锁定，直到累计覆盖申请金额
        let mut locked_cents: i64 = 0;
        for c in &available {
            if locked_cents >= amount_cents {
                break;
            }
            let cid = c
                .id
                .ok_or_else(|| AppError::internal("佣金记录缺少主键"))?;
            tx.exec(
                "update commissions set status = 'withdrawn', withdraw_id = ?, \
                 update_time = now() where id = ? and status = 'available'",
                vec![rbs::value!(withdraw_id), rbs::value!(cid)],
            )
            .await?;
            locked_cents += money::to_cents(c.amount);
        }
        tx.commit().await?;

        info!(
            "提现申请: user_id={} withdraw_id={} amount_cents={} fee_cents={}",
            user_id, withdraw_id, amount_cents, fee_cents
        );
        Ok(WithdrawApplied {
            withdraw_id,
            withdraw_no: record.withdraw_no,
            amount_cents,
            fee_cents,
        })
    }

    /// 审核通过：待审核 -> 已通过
    pub async fn approve(&self, rb: &RBatis, withdraw_id: i64) -> AppResult<()> {
        self.transition(
            rb,
            withdraw_id,
            WithdrawRecord::STATE_PENDING,
            WithdrawRecord::STATE_APPROVED,
        )
        .await
    }

    /// 打款完成：已通过 -> 已打款
    pub async fn complete(&self, rb: &RBatis, withdraw_id: i64) -> AppResult<()> {
        self.transition(
            rb,
            withdraw_id,
            WithdrawRecord::STATE_APPROVED,
            WithdrawRecord::STATE_COMPLETED,
        )
        .await
    }

    /// 驳回：锁定的佣金整体回到可用
    pub async fn reject(&self, rb: &RBatis, withdraw_id: i64, remark: Option<String>) -> AppResult<()> {
        let mut tx = rb.acquire_begin().await?.defer_async(|mut tx| async move {
            if !tx.done() {
                let _ = tx.rollback().await;
            }
        });

        let res = tx
            .exec(
                "update withdraw_records set state = ?, remark = ?, update_time = now() \
                 where id = ? and state in (?, ?)",
                vec![
                    rbs::value!(WithdrawRecord::STATE_REJECTED),
                    rbs::value!(remark),
                    rbs::value!(withdraw_id),
                    rbs::value!(WithdrawRecord::STATE_PENDING),
                    rbs::value!(WithdrawRecord::STATE_APPROVED),
                ],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::conflict("提现单状态不允许驳回"));
        }

        tx.exec(
            "update commissions set status = 'available', withdraw_id = null, \
             update_time = now() where withdraw_id = ? and status = 'withdrawn'",
            vec![rbs::value!(withdraw_id)],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn transition(
        &self,
        rb: &RBatis,
        withdraw_id: i64,
        from: i32,
        to: i32,
    ) -> AppResult<()> {
        let res = rb
            .exec(
                "update withdraw_records set state = ?, update_time = now() \
                 where id = ? and state = ?",
                vec![
                    rbs::value!(to),
                    rbs::value!(withdraw_id),
                    rbs::value!(from),
                ],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::conflict("提现单状态不允许该操作"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> WithdrawalConfig {
        WithdrawalConfig::default()
    }

    #[test]
    fn fee_formula_with_defaults() {
        // 100.00 元：100 + 10000*60/10000 = 160 分
        assert_eq!(calc_fee_cents(&cfg(), 10_000), 160);
        // 10.00 元：100 + 6 = 106 分
        assert_eq!(calc_fee_cents(&cfg(), 1_000), 106);
    }

    #[test]
    fn fee_clamped_by_min_and_cap() {
        let mut c = cfg();
        c.fee_fixed_cents = 0;
        c.fee_rate_bp = 10;
        // 变动部分 1 分，低于下限 100 分
        assert_eq!(calc_fee_cents(&c, 1_000), 100);
        // 巨额触顶
        assert_eq!(calc_fee_cents(&cfg(), 100_000_000), 5_000);
    }
}
