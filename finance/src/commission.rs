use common::config::PartnerConfig;
use common::utils::money;
use common::{AppError, AppResult};
use log::info;
use orm::entities::referral::{Commission, ReferralClosure};
use orm::entities::trade::Order;
use rbatis::executor::{Executor, RBatisTxExecutorGuard};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rates;

/// 佣金账本引擎
///
/// 入账（支付成功事务内）、每日解冻、退款冲正三条路径共用。
pub struct CommissionEngine {
    partner: PartnerConfig,
}

/// 解冻批次汇总
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReleaseSummary {
    pub released: u64,
    pub reversed: u64,
}

/// 账本分状态汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub frozen: Decimal,
    pub available: Decimal,
    pub withdrawn: Decimal,
    pub reversed: Decimal,
}

/// 对账差异行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRow {
    pub commission_id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub reason: String,
}

/// 订单进入这些状态后到期冻结佣金不再入账
const FORFEIT_ORDER_STATUSES: [i32; 3] = [
    Order::STATUS_CANCELLED,
    Order::STATUS_REFUNDING,
    Order::STATUS_REFUNDED,
];

/// 到期解冻时单笔佣金的去向：死单转冲正，其余转可用
pub fn release_target(order_status: i32) -> &'static str {
    if FORFEIT_ORDER_STATUSES.contains(&order_status) {
        Commission::STATUS_REVERSED
    } else {
        Commission::STATUS_AVAILABLE
    }
}

fn forfeit_status_list() -> String {
    FORFEIT_ORDER_STATUSES
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CommissionEngine {
    pub fn new(partner: PartnerConfig) -> Self {
        Self { partner }
    }

    /// 按比例计算单笔佣金，落库边界银行家舍入
    pub fn commission_amount(pay_amount: Decimal, rate: Decimal) -> Decimal {
        money::round2(pay_amount * rate)
    }

    /// 订单支付成功时在同一事务内生成冻结佣金
    ///
    /// 直推佣金发给订单上冻结的分享人；团队佣金沿闭包表向上
    /// 追溯 2..=depth_cap 层。订单已有未冲正佣金时直接返回（幂等）。
    pub async fn settle_order(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        order: &Order,
    ) -> AppResult<Vec<Commission>> {
        let order_id = order
            .id
            .ok_or_else(|| AppError::internal("订单缺少主键"))?;
        let referrer_id = match order.referrer_id {
            Some(id) if id > 0 => id,
            _ => return Ok(Vec::new()),
        };

        let existing = Commission::select_by_order_id(tx, order_id).await?;
        if existing
            .iter()
            .any(|c| c.status != Commission::STATUS_REVERSED)
        {
            return Ok(Vec::new());
        }

        let now = DateTime::now();
        let freeze_until = freeze_until(self.partner.freeze_days);
        let mut created = Vec::new();

        let rate_set = rates::resolve(tx, &self.partner, referrer_id).await?;
        let direct_amount = Self::commission_amount(order.pay_amount, rate_set.direct_rate);
        if direct_amount > Decimal::ZERO {
            let row = Commission {
                id: None,
                order_id,
                user_id: referrer_id,
                source_user_id: order.user_id,
                commission_type: Commission::TYPE_DIRECT.to_string(),
                amount: direct_amount,
                status: Commission::STATUS_FROZEN.to_string(),
                freeze_until: Some(freeze_until.clone()),
                withdraw_id: None,
                create_time: Some(now.clone()),
                update_time: Some(now.clone()),
            };
            Commission::insert(tx, &row).await?;
            created.push(row);
        }

        // 闭包表只可靠维护 depth=1，结算时沿直接上级逐层上溯
        let mut current = referrer_id;
        for _depth in 2..=self.partner.depth_cap.max(1) {
            let parent = match ReferralClosure::select_direct_referrer(tx, current).await? {
                Some(row) => row.ancestor_user_id,
                None => break,
            };
            if parent == order.user_id || parent == current {
                break;
            }
            let rs = rates::resolve(tx, &self.partner, parent).await?;
            let amount = Self::commission_amount(order.pay_amount, rs.team_rate);
            if amount > Decimal::ZERO {
                let row = Commission {
                    id: None,
                    order_id,
                    user_id: parent,
                    source_user_id: order.user_id,
                    commission_type: Commission::TYPE_TEAM.to_string(),
                    amount,
                    status: Commission::STATUS_FROZEN.to_string(),
                    freeze_until: Some(freeze_until.clone()),
                    withdraw_id: None,
                    create_time: Some(now.clone()),
                    update_time: Some(now.clone()),
                };
                Commission::insert(tx, &row).await?;
                created.push(row);
            }
            current = parent;
        }

        Ok(created)
    }

    /// 解冻到期佣金，按批扫描直到不足一批
    ///
    /// 订单已取消/退款中/已退款的冻结佣金转冲正，其余转可用。
    pub async fn release_due(&self, rb: &RBatis, batch_size: u32) -> AppResult<ReleaseSummary> {
        let batch = batch_size.max(1) as i64;
        let now = DateTime::now();
        let dead = forfeit_status_list();
        let mut summary = ReleaseSummary::default();

        loop {
            let res = rb
                .exec(
                    &format!(
                        "update commissions set status = 'reversed', update_time = now() \
                         where status = 'frozen' and freeze_until <= ? \
                         and order_id in (select id from orders where status in ({})) \
                         limit ?",
                        dead
                    ),
                    vec![rbs::value!(now.clone()), rbs::value!(batch)],
                )
                .await?;
            summary.reversed += res.rows_affected;
            if res.rows_affected < batch as u64 {
                break;
            }
        }

        loop {
            let res = rb
                .exec(
                    &format!(
                        "update commissions set status = 'available', update_time = now() \
                         where status = 'frozen' and freeze_until <= ? \
                         and order_id not in (select id from orders where status in ({})) \
                         limit ?",
                        dead
                    ),
                    vec![rbs::value!(now.clone()), rbs::value!(batch)],
                )
                .await?;
            summary.released += res.rows_affected;
            if res.rows_affected < batch as u64 {
                break;
            }
        }

        info!(
            "佣金解冻完成: released={} reversed={}",
            summary.released, summary.reversed
        );
        Ok(summary)
    }

    /// 订单进入已退款时整单冲正
    ///
    /// 冻结与可用直接转冲正；已提现部分写入负向调整行保持账本可追溯。
    pub async fn reverse_for_order(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        order_id: i64,
    ) -> AppResult<u64> {
        let res = tx
            .exec(
                "update commissions set status = 'reversed', update_time = now() \
                 where order_id = ? and status in ('frozen', 'available')",
                vec![rbs::value!(order_id)],
            )
            .await?;
        let mut affected = res.rows_affected;

        let value = tx
            .query(
                "select * from commissions \
                 where order_id = ? and status = 'withdrawn' and commission_type != 'adjust'",
                vec![rbs::value!(order_id)],
            )
            .await?;
        let withdrawn: Vec<Commission> = rbatis::decode(value)?;

        let now = DateTime::now();
        for c in withdrawn {
            let adjust = Commission {
                id: None,
                order_id,
                user_id: c.user_id,
                source_user_id: c.source_user_id,
                commission_type: Commission::TYPE_ADJUST.to_string(),
                amount: -c.amount,
                status: Commission::STATUS_AVAILABLE.to_string(),
                freeze_until: None,
                withdraw_id: None,
                create_time: Some(now.clone()),
                update_time: Some(now.clone()),
            };
            Commission::insert(tx, &adjust).await?;
            affected += 1;
        }

        Ok(affected)
    }

    /// 账本汇总，user_id 为空时统计全量
    pub async fn ledger_summary(
        &self,
        rb: &RBatis,
        user_id: Option<i64>,
    ) -> AppResult<LedgerSummary> {
        const COLUMNS: &str = "coalesce(sum(case when status = 'frozen' then amount else 0 end), 0) as frozen, \
             coalesce(sum(case when status = 'available' then amount else 0 end), 0) as available, \
             coalesce(sum(case when status = 'withdrawn' then amount else 0 end), 0) as withdrawn, \
             coalesce(sum(case when status = 'reversed' then amount else 0 end), 0) as reversed";
        let summary = match user_id {
            Some(uid) => {
                rb.query_decode::<LedgerSummary>(
                    &format!(
                        "select {} from commissions where user_id = ?",
                        COLUMNS
                    ),
                    vec![rbs::value!(uid)],
                )
                .await?
            }
            None => {
                rb.query_decode::<LedgerSummary>(
                    &format!("select {} from commissions", COLUMNS),
                    vec![],
                )
                .await?
            }
        };
        Ok(summary)
    }

    /// 对账：找出直推收益人与订单冻结分享人不一致、
    /// 以及订单已退款但佣金未冲正的行
    pub async fn reconcile_diff(&self, rb: &RBatis) -> AppResult<Vec<ReconcileRow>> {
        let mut rows: Vec<ReconcileRow> = rb
            .query_decode(
                "select c.id as commission_id, c.order_id, c.user_id, \
                 'direct_user_mismatch' as reason \
                 from commissions c join orders o on o.id = c.order_id \
                 where c.commission_type = 'direct' and c.status != 'reversed' \
                 and (o.referrer_id is null or o.referrer_id != c.user_id)",
                vec![],
            )
            .await?;
        let refunded: Vec<ReconcileRow> = rb
            .query_decode(
                "select c.id as commission_id, c.order_id, c.user_id, \
                 'refunded_not_reversed' as reason \
                 from commissions c join orders o on o.id = c.order_id \
                 where o.status = 7 and c.status in ('frozen', 'available') \
                 and c.commission_type != 'adjust'",
                vec![],
            )
            .await?;
        rows.extend(refunded);
        Ok(rows)
    }
}

/// 冻结期截止时间
fn freeze_until(freeze_days: i64) -> DateTime {
    DateTime::from_timestamp_millis(
        DateTime::now().unix_timestamp_millis() + freeze_days * 86_400_000,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn commission_amount_uses_bankers_rounding() {
        let pay = Decimal::from_str("70.00").unwrap();
        let rate = Decimal::from_str("0.10").unwrap();
        assert_eq!(
            CommissionEngine::commission_amount(pay, rate).to_string(),
            "7.00"
        );

        // 0.125 中点取偶
        let pay = Decimal::from_str("1.25").unwrap();
        assert_eq!(
            CommissionEngine::commission_amount(pay, rate).to_string(),
            "0.12"
        );
    }

    #[test]
    fn release_reverses_dead_orders_and_frees_the_rest() {
        assert_eq!(
            release_target(Order::STATUS_CANCELLED),
            Commission::STATUS_REVERSED
        );
        assert_eq!(
            release_target(Order::STATUS_REFUNDING),
            Commission::STATUS_REVERSED
        );
        assert_eq!(
            release_target(Order::STATUS_REFUNDED),
            Commission::STATUS_REVERSED
        );
        assert_eq!(
            release_target(Order::STATUS_PAID),
            Commission::STATUS_AVAILABLE
        );
        assert_eq!(
            release_target(Order::STATUS_COMPLETED),
            Commission::STATUS_AVAILABLE
        );
        // SQL 子查询与判定共用同一份死单状态表
        assert_eq!(forfeit_status_list(), "5, 6, 7");
    }

    #[test]
    fn freeze_until_is_in_the_future() {
        let now_ms = DateTime::now().unix_timestamp_millis();
        let until = freeze_until(7);
        let delta = until.unix_timestamp_millis() - now_ms;
        assert!(delta >= 7 * 86_400_000 - 1_000);
    }
}
