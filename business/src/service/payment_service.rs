use common::config::AppConfig;
use common::constants::topic;
use common::utils::{serial, sign};
use common::mq::MessageQueue;
use common::{AppError, AppResult};
use finance::CommissionEngine;
use orm::entities::trade::{Order, Payment};
use rbatis::executor::{Executor, RBatisTxExecutorGuard};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use super::order_service::can_transition;

/// 回调体存档截断长度
const THIRD_RESPONSE_LIMIT: usize = 2000;

/// 成功通知的支付单终态
///
/// 订单已离开待支付（取消、退款等）时记失败，避免同一订单
/// 出现第二笔成功支付，差额留待对账。
fn settled_payment_state(order_status: i32) -> i32 {
    if can_transition(order_status, Order::STATUS_PAID) {
        Payment::STATE_SUCCESS
    } else {
        Payment::STATE_FAILED
    }
}

/// 回调 paidAt：秒级时间戳或日期时间字符串
fn parse_paid_at(value: Option<&Value>) -> Option<DateTime> {
    match value {
        Some(Value::Number(n)) => n.as_i64().map(DateTime::from_timestamp),
        Some(Value::String(s)) => DateTime::from_str(s).ok(),
        _ => None,
    }
}

/// 支付服务
///
/// 回调幂等以 payment_no 的行锁为锚点，佣金结算与订单状态
/// 迁移在同一事务内提交。
pub struct PaymentService {
    rb: Arc<RBatis>,
    config: Arc<AppConfig>,
    commission_engine: Arc<CommissionEngine>,
    mq: Arc<MessageQueue>,
}

impl PaymentService {
    pub fn new(
        rb: Arc<RBatis>,
        config: Arc<AppConfig>,
        commission_engine: Arc<CommissionEngine>,
        mq: Arc<MessageQueue>,
    ) -> Self {
        Self {
            rb,
            config,
            commission_engine,
            mq,
        }
    }

    /// 统一下单：生成（或复用）支付单并返回签名的预支付参数
    ///
    /// 复用与插入都在订单行锁内完成，并发下单同一订单只会
    /// 产生一笔在途支付单。
    pub async fn unified_order(
        &self,
        user_id: i64,
        order_id: i64,
        method: Option<String>,
    ) -> AppResult<Value> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if order.user_id != user_id {
            return Err(AppError::forbidden("无权支付该订单"));
        }
        if order.status != Order::STATUS_PENDING {
            return Err(AppError::conflict("订单不是待支付状态"));
        }

        let value = tx
            .query(
                "select * from payments where order_id = ? and trade_state = ?",
                vec![rbs::value!(order_id), rbs::value!(Payment::STATE_PENDING)],
            )
            .await?;
        let rows: Vec<Payment> = rbatis::decode(value)?;
        let payment = match rows.into_iter().next() {
            Some(existing) => existing,
            None => {
                let now = DateTime::now();
                let payment = Payment {
                    id: None,
                    payment_no: serial::payment_no(),
                    order_id,
                    amount: order.pay_amount,
                    method: method.clone(),
                    trade_state: Payment::STATE_PENDING,
                    external_txn_id: None,
                    signature_verified: None,
                    third_response: None,
                    notify_at: None,
                    paid_at: None,
                    create_time: Some(now.clone()),
                    update_time: Some(now),
                };
                let res = Payment::insert(&mut tx, &payment).await?;
                Payment {
                    id: res.last_insert_id.as_i64(),
                    ..payment
                }
            }
        };
        tx.commit().await?;

        let mut body = json!({
            "paymentNo": payment.payment_no,
            "orderNo": order.order_no,
            "amount": payment.amount.to_string(),
            "method": payment.method,
            "timestamp": DateTime::now().unix_timestamp(),
        });
        let signature = sign::sign(&self.config.wechat.api_key, &body);
        body["sign"] = Value::String(signature);
        Ok(body)
    }

    /// 支付回调
    ///
    /// 签名不合法直接拒绝；testMode 仅 local 环境放行免签。
    /// 重复通知命中已成功的支付单时返回成功，不产生二次副作用。
    pub async fn handle_callback(&self, body: &Value) -> AppResult<()> {
        let test_mode = body
            .get("testMode")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let skip_sign = test_mode && self.config.is_local_env();
        let verified = if skip_sign {
            false
        } else {
            let given = body.get("sign").and_then(Value::as_str).unwrap_or("");
            if !sign::verify(&self.config.wechat.api_key, body, given) {
                return Err(AppError::Signature);
            }
            true
        };

        let payment_no = body
            .get("paymentNo")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::invalid_param("缺少 paymentNo"))?;
        let trade_state = body
            .get("tradeState")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::invalid_param("缺少 tradeState"))?;
        let external_txn_id = body.get("transactionId").and_then(Value::as_str);

        let mut tx = self.begin().await?;
        let value = tx
            .query(
                "select * from payments where payment_no = ? for update",
                vec![rbs::value!(payment_no)],
            )
            .await?;
        let rows: Vec<Payment> = rbatis::decode(value)?;
        let payment = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("支付单不存在"))?;

        // 重复通知：已是终态直接成功返回
        if payment.trade_state != Payment::STATE_PENDING {
            return Ok(());
        }

        let archived: String = body.to_string().chars().take(THIRD_RESPONSE_LIMIT).collect();

        if trade_state.eq_ignore_ascii_case("SUCCESS") {
            let order = self.lock_order(&mut tx, payment.order_id).await?;
            if settled_payment_state(order.status) == Payment::STATE_SUCCESS {
                let paid_at = parse_paid_at(body.get("paidAt")).unwrap_or_else(DateTime::now);
                tx.exec(
                    "update payments set trade_state = ?, external_txn_id = ?, \
                     signature_verified = ?, third_response = ?, notify_at = now(), \
                     paid_at = ?, update_time = now() where id = ?",
                    vec![
                        rbs::value!(Payment::STATE_SUCCESS),
                        rbs::value!(external_txn_id),
                        rbs::value!(if verified { 1 } else { 0 }),
                        rbs::value!(archived),
                        rbs::value!(paid_at),
                        rbs::value!(payment.id.unwrap_or_default()),
                    ],
                )
                .await?;
                tx.exec(
                    "update orders set status = ?, pay_status = ?, paid_at = now(), \
                     update_time = now() where id = ? and status = ?",
                    vec![
                        rbs::value!(Order::STATUS_PAID),
                        rbs::value!(Order::PAY_PAID),
                        rbs::value!(order.id.unwrap_or_default()),
                        rbs::value!(Order::STATUS_PENDING),
                    ],
                )
                .await?;
                self.commission_engine.settle_order(&mut tx, &order).await?;
                tx.commit().await?;
                self.mq
                    .publish_best_effort(
                        topic::ORDER_PAID,
                        &json!({
                            "order_id": order.id,
                            "order_no": order.order_no,
                            "user_id": order.user_id,
                            "payment_no": payment.payment_no,
                            "amount": payment.amount,
                        }),
                    )
                    .await;
            } else {
                // 订单已不在待支付（如先取消后到成功通知），
                // 支付单记失败，不得成为订单的第二笔成功支付
                tx.exec(
                    "update payments set trade_state = ?, signature_verified = ?, \
                     third_response = ?, notify_at = now(), update_time = now() where id = ?",
                    vec![
                        rbs::value!(Payment::STATE_FAILED),
                        rbs::value!(if verified { 1 } else { 0 }),
                        rbs::value!(archived),
                        rbs::value!(payment.id.unwrap_or_default()),
                    ],
                )
                .await?;
                log::warn!(
                    "payment {} succeeded but order {} in status {}",
                    payment.payment_no,
                    payment.order_id,
                    order.status
                );
                tx.commit().await?;
            }
        } else {
            tx.exec(
                "update payments set trade_state = ?, signature_verified = ?, \
                 third_response = ?, notify_at = now(), update_time = now() where id = ?",
                vec![
                    rbs::value!(Payment::STATE_FAILED),
                    rbs::value!(if verified { 1 } else { 0 }),
                    rbs::value!(archived),
                    rbs::value!(payment.id.unwrap_or_default()),
                ],
            )
            .await?;
            tx.commit().await?;
        }
        Ok(())
    }

    async fn lock_order(&self, tx: &mut RBatisTxExecutorGuard, order_id: i64) -> AppResult<Order> {
        let value = tx
            .query(
                "select * from orders where id = ? for update",
                vec![rbs::value!(order_id)],
            )
            .await?;
        let rows: Vec<Order> = rbatis::decode(value)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("订单不存在"))
    }

    async fn begin(&self) -> AppResult<RBatisTxExecutorGuard> {
        Ok(self
            .rb
            .acquire_begin()
            .await?
            .defer_async(|mut tx| async move {
                if !tx.done() {
                    let _ = tx.rollback().await;
                }
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn late_success_never_books_a_second_success() {
        // 待支付订单正常入账
        assert_eq!(
            settled_payment_state(Order::STATUS_PENDING),
            Payment::STATE_SUCCESS
        );
        // 订单已取消/已支付/已退款时成功通知记失败
        assert_eq!(
            settled_payment_state(Order::STATUS_CANCELLED),
            Payment::STATE_FAILED
        );
        assert_eq!(
            settled_payment_state(Order::STATUS_PAID),
            Payment::STATE_FAILED
        );
        assert_eq!(
            settled_payment_state(Order::STATUS_REFUNDED),
            Payment::STATE_FAILED
        );
    }

    #[test]
    fn paid_at_accepts_epoch_seconds_and_datetime_string() {
        let ts = parse_paid_at(Some(&json!(1735700000))).unwrap();
        assert_eq!(ts.unix_timestamp(), 1735700000);
        assert!(parse_paid_at(Some(&json!("2025-01-01 10:30:00"))).is_some());
        assert!(parse_paid_at(Some(&json!(true))).is_none());
        assert!(parse_paid_at(None).is_none());
    }
}
