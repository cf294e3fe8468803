use common::constants::topic;
use common::utils::serial;
use common::mq::MessageQueue;
use common::{AppError, AppResult};
use finance::CommissionEngine;
use orm::entities::catalog::{Product, Store, StoreProduct};
use orm::entities::referral::ReferralClosure;
use orm::entities::trade::{Cart, CartItem, Order, OrderItem, Payment, Refund};
use rbatis::executor::{Executor, RBatisTxExecutorGuard};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::auth::Identity;
use crate::models::{AdminOrderQuery, CreateOrderReq, StoreStats};

use super::coupon_service::CouponService;
use super::store_scope;

/// 订单状态机
///
/// 状态只沿此表迁移，重复迁移到当前状态视为幂等成功。
pub fn can_transition(from: i32, to: i32) -> bool {
    matches!(
        (from, to),
        (Order::STATUS_PENDING, Order::STATUS_PAID)
            | (Order::STATUS_PENDING, Order::STATUS_CANCELLED)
            | (Order::STATUS_PAID, Order::STATUS_SHIPPING)
            | (Order::STATUS_PAID, Order::STATUS_COMPLETED)
            | (Order::STATUS_SHIPPING, Order::STATUS_COMPLETED)
            | (Order::STATUS_PAID, Order::STATUS_REFUNDING)
            | (Order::STATUS_COMPLETED, Order::STATUS_REFUNDING)
            | (Order::STATUS_REFUNDING, Order::STATUS_REFUNDED)
            | (Order::STATUS_REFUNDING, Order::STATUS_PAID)
            | (Order::STATUS_REFUNDING, Order::STATUS_COMPLETED)
    )
}

struct PricedLine {
    product_id: i64,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

/// 订单服务
pub struct OrderService {
    rb: Arc<RBatis>,
    coupon_service: Arc<CouponService>,
    commission_engine: Arc<CommissionEngine>,
    mq: Arc<MessageQueue>,
}

impl OrderService {
    pub fn new(
        rb: Arc<RBatis>,
        coupon_service: Arc<CouponService>,
        commission_engine: Arc<CommissionEngine>,
        mq: Arc<MessageQueue>,
    ) -> Self {
        Self {
            rb,
            coupon_service,
            commission_engine,
            mq,
        }
    }

    /// 购物车勾选项下单
    ///
    /// 校验、定价、扣库存、用券、归因冻结在同一事务内完成；
    /// 消息在提交后尽力发布。
    pub async fn create_from_cart(
        &self,
        identity: &Identity,
        req: &CreateOrderReq,
    ) -> AppResult<Order> {
        if req.order_type != Order::TYPE_DELIVERY && req.order_type != Order::TYPE_DINE_IN {
            return Err(AppError::invalid_param("订单类型不合法"));
        }
        if req.order_type == Order::TYPE_DINE_IN && req.store_id == 0 {
            return Err(AppError::invalid_param("堂食订单必须指定门店"));
        }
        if req.store_id != 0 {
            let store = Store::select_by_id(self.rb.as_ref(), req.store_id)
                .await?
                .ok_or_else(|| AppError::not_found("门店不存在"))?;
            if store.status != Store::STATUS_OPEN {
                return Err(AppError::conflict("门店已停业"));
            }
        }

        let cart = Cart::select_by_user_id(self.rb.as_ref(), identity.user_id)
            .await?
            .ok_or_else(|| AppError::conflict("购物车为空"))?;
        let cart_id = cart.id.unwrap_or_default();

        let mut tx = self.begin().await?;

        let lines = CartItem::select_selected(&tx, cart_id).await?;
        if lines.is_empty() {
            return Err(AppError::conflict("购物车没有勾选的商品"));
        }

        let priced = self.price_lines(&mut tx, req.store_id, &lines).await?;

        // 扣库存：门店订单走门店库存，商城订单走平台库存
        for line in &priced {
            self.decrement_stock(&mut tx, req.store_id, line.product_id, line.quantity)
                .await?;
        }

        let total: Decimal = priced
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();

        let discount = match req.user_coupon_id {
            Some(uc_id) if uc_id > 0 => {
                self.coupon_service
                    .validate_for_order(&mut tx, identity.user_id, uc_id, req.store_id, total)
                    .await?
            }
            _ => Decimal::ZERO,
        };
        let pay_amount = total - discount;

        let (referrer_id, share_store_id) = self
            .resolve_attribution(&mut tx, identity.user_id, req)
            .await?;

        let now = DateTime::now();
        let order = Order {
            id: None,
            order_no: serial::order_no(),
            user_id: identity.user_id,
            store_id: req.store_id,
            order_type: req.order_type,
            status: Order::STATUS_PENDING,
            pay_status: Order::PAY_UNPAID,
            total_amount: total,
            discount_amount: discount,
            pay_amount,
            referrer_id,
            share_store_id,
            user_coupon_id: req.user_coupon_id.filter(|id| *id > 0),
            remark: req.remark.clone(),
            cancel_reason: None,
            paid_at: None,
            completed_at: None,
            cancelled_at: None,
            create_time: Some(now.clone()),
            update_time: Some(now),
        };
        let res = Order::insert(&tx, &order).await?;
        let order_id = res
            .last_insert_id
            .as_i64()
            .ok_or_else(|| AppError::internal("订单主键缺失"))?;

        for line in &priced {
            let item = OrderItem {
                id: None,
                order_id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                subtotal: line.unit_price * Decimal::from(line.quantity),
            };
            OrderItem::insert(&tx, &item).await?;
        }

        if let Some(uc_id) = order.user_coupon_id {
            self.coupon_service.mark_used(&mut tx, uc_id, order_id).await?;
        }

        // 只清掉已下单的勾选项，未勾选的保留
        tx.exec(
            "delete from cart_items where cart_id = ? and selected = 1",
            vec![rbs::value!(cart_id)],
        )
        .await?;

        tx.commit().await?;

        let order = Order {
            id: Some(order_id),
            ..order
        };
        self.mq
            .publish_best_effort(
                topic::ORDER_CREATED,
                &json!({
                    "order_id": order_id,
                    "order_no": order.order_no,
                    "user_id": order.user_id,
                    "store_id": order.store_id,
                    "pay_amount": order.pay_amount,
                }),
            )
            .await;
        Ok(order)
    }

    /// 定价与经营范围校验
    async fn price_lines(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        store_id: i64,
        lines: &[CartItem],
    ) -> AppResult<Vec<PricedLine>> {
        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity <= 0 {
                return Err(AppError::invalid_param("数量必须大于 0"));
            }
            let product = Product::select_by_id(&*tx, line.product_id)
                .await?
                .ok_or_else(|| AppError::not_found("商品不存在"))?;
            if product.status != Product::STATUS_ON_SALE {
                return Err(AppError::conflict(format!("商品已下架: {}", product.name)));
            }

            let unit_price = if store_id != 0 {
                let binding = StoreProduct::select_one(&*tx, store_id, line.product_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::conflict(format!("商品不在该门店经营范围内: {}", product.name))
                    })?;
                binding.price_override.unwrap_or(product.price)
            } else {
                // 门店专供商品不允许进入商城订单
                let exclusive = self.count_exclusive_bindings(tx, line.product_id).await?;
                if exclusive > 0 {
                    return Err(AppError::conflict(format!(
                        "门店专供商品不能在商城下单: {}",
                        product.name
                    )));
                }
                product.price
            };
            if unit_price <= Decimal::ZERO {
                return Err(AppError::conflict(format!("商品定价异常: {}", product.name)));
            }
            priced.push(PricedLine {
                product_id: line.product_id,
                product_name: product.name,
                unit_price,
                quantity: line.quantity,
            });
        }
        Ok(priced)
    }

    async fn count_exclusive_bindings(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        product_id: i64,
    ) -> AppResult<i64> {
        let value = tx
            .query(
                "select count(*) from store_products where product_id = ? and biz_type = ?",
                vec![
                    rbs::value!(product_id),
                    rbs::value!(StoreProduct::BIZ_STORE_EXCLUSIVE),
                ],
            )
            .await?;
        Ok(rbatis::decode(value)?)
    }

    async fn decrement_stock(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        store_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<()> {
        let res = if store_id != 0 {
            tx.exec(
                "update store_products set stock = stock - ? \
                 where store_id = ? and product_id = ? and stock >= ?",
                vec![
                    rbs::value!(quantity),
                    rbs::value!(store_id),
                    rbs::value!(product_id),
                    rbs::value!(quantity),
                ],
            )
            .await?
        } else {
            tx.exec(
                "update products set stock = stock - ? where id = ? and stock >= ?",
                vec![
                    rbs::value!(quantity),
                    rbs::value!(product_id),
                    rbs::value!(quantity),
                ],
            )
            .await?
        };
        if res.rows_affected == 0 {
            return Err(AppError::conflict("库存不足"));
        }
        Ok(())
    }

    async fn restore_stock(&self, tx: &mut RBatisTxExecutorGuard, order: &Order) -> AppResult<()> {
        let order_id = order.id.unwrap_or_default();
        let items = OrderItem::select_by_order_id(&*tx, order_id).await?;
        for item in items {
            if order.store_id != 0 {
                tx.exec(
                    "update store_products set stock = stock + ? \
                     where store_id = ? and product_id = ?",
                    vec![
                        rbs::value!(item.quantity),
                        rbs::value!(order.store_id),
                        rbs::value!(item.product_id),
                    ],
                )
                .await?;
            } else {
                tx.exec(
                    "update products set stock = stock + ? where id = ?",
                    vec![rbs::value!(item.quantity), rbs::value!(item.product_id)],
                )
                .await?;
            }
        }
        Ok(())
    }

    /// 归因：分享人优先，缺省回落到当前直接上级
    ///
    /// 分享归因的门店必须与订单门店一致（商城订单要求 share_store_id 为 0），
    /// 自己分享给自己不产生归因。
    async fn resolve_attribution(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        user_id: i64,
        req: &CreateOrderReq,
    ) -> AppResult<(Option<i64>, Option<i64>)> {
        if req.sharer_uid != 0 {
            if req.share_store_id != req.store_id {
                return Err(AppError::conflict("分享归因与订单门店不一致"));
            }
            if req.sharer_uid == user_id {
                return Ok((None, None));
            }
            return Ok((Some(req.sharer_uid), Some(req.share_store_id)));
        }
        let referrer = ReferralClosure::select_direct_referrer(&*tx, user_id)
            .await?
            .map(|link| link.ancestor_user_id);
        Ok((referrer, None))
    }

    /// 用户取消（仅待支付可取消）
    pub async fn cancel(&self, user_id: i64, order_id: i64, reason: Option<String>) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if order.user_id != user_id {
            return Err(AppError::forbidden("无权操作该订单"));
        }
        self.cancel_in_tx(&mut tx, order, reason).await?;
        tx.commit().await?;
        Ok(())
    }

    /// 管理端/门店端取消
    pub async fn admin_cancel(
        &self,
        identity: &Identity,
        order_id: i64,
        reason: Option<String>,
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if !identity.is_admin() {
            store_scope::assert_store_scope(self.rb.as_ref(), identity, order.store_id).await?;
        }
        self.cancel_in_tx(&mut tx, order, reason).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn cancel_in_tx(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        order: Order,
        reason: Option<String>,
    ) -> AppResult<()> {
        if order.status == Order::STATUS_CANCELLED {
            return Ok(());
        }
        if !can_transition(order.status, Order::STATUS_CANCELLED) {
            return Err(AppError::conflict("当前状态不可取消"));
        }
        self.restore_stock(tx, &order).await?;
        if let Some(uc_id) = order.user_coupon_id {
            self.coupon_service.release(tx, uc_id).await?;
        }
        tx.exec(
            "update orders set status = ?, cancel_reason = ?, cancelled_at = now(), \
             update_time = now() where id = ? and status = ?",
            vec![
                rbs::value!(Order::STATUS_CANCELLED),
                rbs::value!(reason),
                rbs::value!(order.id.unwrap_or_default()),
                rbs::value!(order.status),
            ],
        )
        .await?;
        Ok(())
    }

    /// 发货（仅配送单，已支付 -> 配送中）
    pub async fn deliver(&self, identity: &Identity, order_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if !identity.is_admin() {
            store_scope::assert_store_scope(self.rb.as_ref(), identity, order.store_id).await?;
        }
        if order.order_type != Order::TYPE_DELIVERY {
            return Err(AppError::conflict("非配送订单不能发货"));
        }
        if order.status == Order::STATUS_SHIPPING {
            return Ok(());
        }
        self.transition(&mut tx, &order, Order::STATUS_SHIPPING, "当前状态不可发货")
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// 确认收货/完成
    ///
    /// 配送单从配送中完成，堂食单可从已支付直接完成。
    pub async fn receive(&self, user_id: i64, order_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if order.user_id != user_id {
            return Err(AppError::forbidden("无权操作该订单"));
        }
        if order.status == Order::STATUS_COMPLETED {
            return Ok(());
        }
        if order.order_type == Order::TYPE_DELIVERY && order.status != Order::STATUS_SHIPPING {
            return Err(AppError::conflict("订单尚未发货"));
        }
        self.complete_in_tx(&mut tx, &order).await?;
        tx.commit().await?;
        Ok(())
    }

    /// 门店端完成订单
    pub async fn complete(&self, identity: &Identity, order_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if !identity.is_admin() {
            store_scope::assert_store_scope(self.rb.as_ref(), identity, order.store_id).await?;
        }
        if order.status == Order::STATUS_COMPLETED {
            return Ok(());
        }
        self.complete_in_tx(&mut tx, &order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn complete_in_tx(&self, tx: &mut RBatisTxExecutorGuard, order: &Order) -> AppResult<()> {
        if !can_transition(order.status, Order::STATUS_COMPLETED) {
            return Err(AppError::conflict("当前状态不可完成"));
        }
        tx.exec(
            "update orders set status = ?, completed_at = now(), update_time = now() \
             where id = ? and status = ?",
            vec![
                rbs::value!(Order::STATUS_COMPLETED),
                rbs::value!(order.id.unwrap_or_default()),
                rbs::value!(order.status),
            ],
        )
        .await?;
        Ok(())
    }

    /// 发起退款（已支付/已完成 -> 退款中）
    pub async fn refund_start(
        &self,
        identity: &Identity,
        order_id: i64,
        reason: Option<String>,
    ) -> AppResult<Refund> {
        let mut tx = self.begin().await?;
        let order = self.lock_order(&mut tx, order_id).await?;
        if !identity.is_admin() && order.user_id != identity.user_id {
            return Err(AppError::forbidden("无权操作该订单"));
        }
        if order.status == Order::STATUS_REFUNDING {
            // 幂等：返回进行中的退款单
            let existing = Refund::select_by_order_id(&tx, order_id).await?;
            if let Some(refund) = existing
                .into_iter()
                .find(|r| r.state == Refund::STATE_PROCESSING)
            {
                return Ok(refund);
            }
        }
        if !can_transition(order.status, Order::STATUS_REFUNDING) {
            return Err(AppError::conflict("当前状态不可退款"));
        }

        let payments = Payment::select_by_order_id(&tx, order_id).await?;
        let payment = payments
            .into_iter()
            .find(|p| p.trade_state == Payment::STATE_SUCCESS)
            .ok_or_else(|| AppError::conflict("订单没有成功的支付记录"))?;

        self.transition(&mut tx, &order, Order::STATUS_REFUNDING, "当前状态不可退款")
            .await?;

        let now = DateTime::now();
        let refund = Refund {
            id: None,
            refund_no: serial::refund_no(),
            order_id,
            payment_id: payment.id.unwrap_or_default(),
            amount: order.pay_amount,
            state: Refund::STATE_PROCESSING,
            reason,
            create_time: Some(now.clone()),
            update_time: Some(now),
        };
        let res = Refund::insert(&tx, &refund).await?;
        tx.commit().await?;
        Ok(Refund {
            id: res.last_insert_id.as_i64(),
            ..refund
        })
    }

    /// 退款结果确认
    ///
    /// 成功：还库存、冲销佣金、订单置已退款；
    /// 失败：订单回到退款前的状态（按 completed_at 判断）。
    pub async fn refund_confirm(
        &self,
        order_id: i64,
        refund_no: &str,
        success: bool,
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let value = tx
            .query(
                "select * from refunds where refund_no = ? for update",
                vec![rbs::value!(refund_no)],
            )
            .await?;
        let rows: Vec<Refund> = rbatis::decode(value)?;
        let refund = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("退款单不存在"))?;
        if refund.order_id != order_id {
            return Err(AppError::invalid_param("退款单与订单不匹配"));
        }
        if refund.state != Refund::STATE_PROCESSING {
            return Ok(());
        }
        let order = self.lock_order(&mut tx, refund.order_id).await?;
        if order.status != Order::STATUS_REFUNDING {
            return Err(AppError::conflict("订单不在退款中"));
        }

        if success {
            tx.exec(
                "update refunds set state = ?, update_time = now() where id = ?",
                vec![
                    rbs::value!(Refund::STATE_SUCCESS),
                    rbs::value!(refund.id.unwrap_or_default()),
                ],
            )
            .await?;
            self.restore_stock(&mut tx, &order).await?;
            tx.exec(
                "update orders set status = ?, pay_status = ?, update_time = now() \
                 where id = ? and status = ?",
                vec![
                    rbs::value!(Order::STATUS_REFUNDED),
                    rbs::value!(Order::PAY_REFUNDED),
                    rbs::value!(order.id.unwrap_or_default()),
                    rbs::value!(Order::STATUS_REFUNDING),
                ],
            )
            .await?;
            self.commission_engine
                .reverse_for_order(&mut tx, refund.order_id)
                .await?;
            tx.commit().await?;
            self.mq
                .publish_best_effort(
                    topic::ORDER_REFUNDED,
                    &json!({
                        "order_id": refund.order_id,
                        "order_no": order.order_no,
                        "refund_no": refund.refund_no,
                        "amount": refund.amount,
                    }),
                )
                .await;
        } else {
            tx.exec(
                "update refunds set state = ?, update_time = now() where id = ?",
                vec![
                    rbs::value!(Refund::STATE_FAILED),
                    rbs::value!(refund.id.unwrap_or_default()),
                ],
            )
            .await?;
            let back_to = if order.completed_at.is_some() {
                Order::STATUS_COMPLETED
            } else {
                Order::STATUS_PAID
            };
            tx.exec(
                "update orders set status = ?, update_time = now() \
                 where id = ? and status = ?",
                vec![
                    rbs::value!(back_to),
                    rbs::value!(order.id.unwrap_or_default()),
                    rbs::value!(Order::STATUS_REFUNDING),
                ],
            )
            .await?;
            tx.commit().await?;
        }
        Ok(())
    }

    pub async fn my_orders(
        &self,
        user_id: i64,
        status: Option<i32>,
        page_offset: u64,
        page_size: u64,
    ) -> AppResult<Vec<Order>> {
        Ok(match status {
            Some(s) => {
                Order::select_by_user_status(self.rb.as_ref(), user_id, s, page_offset, page_size)
                    .await?
            }
            None => Order::select_by_user(self.rb.as_ref(), user_id, page_offset, page_size).await?,
        })
    }

    pub async fn store_orders(
        &self,
        identity: &Identity,
        store_id: i64,
        page_offset: u64,
        page_size: u64,
    ) -> AppResult<Vec<Order>> {
        store_scope::assert_store_scope(self.rb.as_ref(), identity, store_id).await?;
        Ok(Order::select_by_store(self.rb.as_ref(), store_id, page_offset, page_size).await?)
    }

    /// 管理端订单列表（门店/状态/时间窗筛选）
    pub async fn admin_orders(
        &self,
        query: &AdminOrderQuery,
    ) -> AppResult<(Vec<Order>, u64)> {
        let mut conditions = Vec::new();
        let mut args = Vec::new();
        if let Some(status) = query.status {
            conditions.push("status = ?");
            args.push(rbs::value!(status));
        }
        if let Some(store_id) = query.store_id {
            conditions.push("store_id = ?");
            args.push(rbs::value!(store_id));
        }
        if let Some(begin) = &query.begin {
            conditions.push("create_time >= ?");
            args.push(rbs::value!(begin.clone()));
        }
        if let Some(end) = &query.end {
            conditions.push("create_time <= ?");
            args.push(rbs::value!(end.clone()));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" where {}", conditions.join(" and "))
        };

        let total: u64 = self
            .rb
            .query_decode(
                &format!("select count(*) from orders{}", where_clause),
                args.clone(),
            )
            .await?;

        let size = query.size.clamp(1, 100);
        let offset = query.page.saturating_sub(1) * size;
        args.push(rbs::value!(offset));
        args.push(rbs::value!(size));
        let rows: Vec<Order> = self
            .rb
            .query_decode(
                &format!(
                    "select * from orders{} order by id desc limit ?, ?",
                    where_clause
                ),
                args,
            )
            .await?;
        Ok((rows, total))
    }

    /// 门店经营统计：已完成订单数与营业额
    pub async fn store_stats(&self, identity: &Identity, store_id: i64) -> AppResult<StoreStats> {
        store_scope::assert_store_scope(self.rb.as_ref(), identity, store_id).await?;
        let stats: StoreStats = self
            .rb
            .query_decode(
                "select count(*) as completed_orders, \
                 coalesce(sum(pay_amount), 0) as turnover \
                 from orders where store_id = ? and status = ?",
                vec![rbs::value!(store_id), rbs::value!(Order::STATUS_COMPLETED)],
            )
            .await?;
        Ok(stats)
    }

    pub async fn detail(
        &self,
        identity: &Identity,
        order_id: i64,
    ) -> AppResult<(Order, Vec<OrderItem>)> {
        let order = Order::select_by_id(self.rb.as_ref(), order_id)
            .await?
            .ok_or_else(|| AppError::not_found("订单不存在"))?;
        if !identity.is_admin() && order.user_id != identity.user_id {
            store_scope::assert_store_scope(self.rb.as_ref(), identity, order.store_id).await?;
        }
        let items = OrderItem::select_by_order_id(self.rb.as_ref(), order_id).await?;
        Ok((order, items))
    }

    async fn transition(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        order: &Order,
        to: i32,
        message: &str,
    ) -> AppResult<()> {
        if !can_transition(order.status, to) {
            return Err(AppError::conflict(message));
        }
        let res = tx
            .exec(
                "update orders set status = ?, update_time = now() where id = ? and status = ?",
                vec![
                    rbs::value!(to),
                    rbs::value!(order.id.unwrap_or_default()),
                    rbs::value!(order.status),
                ],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::conflict(message));
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

    #[test]
    fn transitions_follow_state_machine() {
        assert!(can_transition(Order::STATUS_PENDING, Order::STATUS_PAID));
        assert!(can_transition(Order::STATUS_PENDING, Order::STATUS_CANCELLED));
        assert!(can_transition(Order::STATUS_PAID, Order::STATUS_SHIPPING));
        assert!(can_transition(Order::STATUS_SHIPPING, Order::STATUS_COMPLETED));
        assert!(can_transition(Order::STATUS_PAID, Order::STATUS_COMPLETED));
        assert!(can_transition(Order::STATUS_COMPLETED, Order::STATUS_REFUNDING));
        assert!(can_transition(Order::STATUS_REFUNDING, Order::STATUS_REFUNDED));
        assert!(can_transition(Order::STATUS_REFUNDING, Order::STATUS_PAID));
    }

    #[test]
    fn illegal_transitions_rejected() {
        assert!(!can_transition(Order::STATUS_PAID, Order::STATUS_CANCELLED));
        assert!(!can_transition(Order::STATUS_SHIPPING, Order::STATUS_PENDING));
        assert!(!can_transition(Order::STATUS_CANCELLED, Order::STATUS_PAID));
        assert!(!can_transition(Order::STATUS_REFUNDED, Order::STATUS_REFUNDING));
        assert!(!can_transition(Order::STATUS_PENDING, Order::STATUS_COMPLETED));
    }
}
