use common::utils::money;
use common::{AppError, AppResult};
use orm::entities::marketing::{Coupon, UserCoupon};
use rbatis::executor::{Executor, RBatisTxExecutorGuard};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use rust_decimal::Decimal;
use std::sync::Arc;

/// 优惠券服务
pub struct CouponService {
    rb: Arc<RBatis>,
}

/// 按券类型计算折扣额
///
/// 满减/立减取面额；折扣券 amount 为折扣百分比（90 表示九折）。
/// min_amount 门槛对所有券型生效，结果不超过订单总额。
pub fn compute_discount(
    coupon_type: i32,
    amount: Decimal,
    min_amount: Decimal,
    total: Decimal,
) -> AppResult<Decimal> {
    if total < min_amount {
        return Err(AppError::conflict("未达到使用门槛"));
    }
    let discount = match coupon_type {
        Coupon::TYPE_THRESHOLD => amount,
        Coupon::TYPE_FIXED => amount,
        Coupon::TYPE_PERCENTAGE => {
            if amount <= Decimal::ZERO || amount > Decimal::from(100) {
                return Err(AppError::conflict("折扣比例不合法"));
            }
            money::round2(total * (Decimal::ONE - amount / Decimal::from(100)))
        }
        _ => return Err(AppError::conflict("未知的优惠券类型")),
    };
    if discount < Decimal::ZERO {
        return Err(AppError::conflict("折扣额不合法"));
    }
    Ok(discount.min(total))
}

/// 门店券适用性：store_id 为 0 表示全场通用
pub fn applies_to_store(coupon_store_id: i64, order_store_id: i64) -> bool {
    coupon_store_id == 0 || coupon_store_id == order_store_id
}

impl CouponService {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }

    pub async fn list_enabled(&self) -> AppResult<Vec<Coupon>> {
        Ok(Coupon::select_enabled(self.rb.as_ref()).await?)
    }

    pub async fn my_coupons(&self, user_id: i64) -> AppResult<Vec<UserCoupon>> {
        Ok(UserCoupon::select_by_user(self.rb.as_ref(), user_id).await?)
    }

    pub async fn create(&self, coupon: Coupon) -> AppResult<Coupon> {
        if coupon.amount <= Decimal::ZERO {
            return Err(AppError::invalid_param("券面额必须大于 0"));
        }
        let res = Coupon::insert(self.rb.as_ref(), &coupon).await?;
        Ok(Coupon {
            id: res.last_insert_id.as_i64(),
            ..coupon
        })
    }

    /// 发券（受总量约束）
    pub async fn grant(&self, user_id: i64, coupon_id: i64) -> AppResult<UserCoupon> {
        let coupon = Coupon::select_by_id(self.rb.as_ref(), coupon_id)
            .await?
            .ok_or_else(|| AppError::not_found("优惠券不存在"))?;
        if coupon.status != Coupon::STATUS_ENABLED {
            return Err(AppError::conflict("优惠券已停用"));
        }
        if let Some(total) = coupon.total_count {
            let res = self
                .rb
                .exec(
                    "update coupons set used_count = coalesce(used_count, 0) + 1 \
                     where id = ? and coalesce(used_count, 0) < ?",
                    vec![rbs::value!(coupon_id), rbs::value!(total)],
                )
                .await?;
            if res.rows_affected == 0 {
                return Err(AppError::conflict("优惠券已发完"));
            }
        }
        let uc = UserCoupon {
            id: None,
            user_id,
            coupon_id,
            status: UserCoupon::STATUS_UNUSED,
            order_id: None,
            used_at: None,
            create_time: Some(DateTime::now()),
        };
        let res = UserCoupon::insert(self.rb.as_ref(), &uc).await?;
        Ok(UserCoupon {
            id: res.last_insert_id.as_i64(),
            ..uc
        })
    }

    /// 下单事务内校验并计算折扣（不改状态，核销单独一步）
    pub async fn validate_for_order(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        user_id: i64,
        user_coupon_id: i64,
        order_store_id: i64,
        total: Decimal,
    ) -> AppResult<Decimal> {
        let value = tx
            .query(
                "select * from user_coupons where id = ? for update",
                vec![rbs::value!(user_coupon_id)],
            )
            .await?;
        let rows: Vec<UserCoupon> = rbatis::decode(value)?;
        let uc = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("优惠券不存在"))?;
        if uc.user_id != user_id {
            return Err(AppError::forbidden("不能使用他人优惠券"));
        }
        if uc.status != UserCoupon::STATUS_UNUSED {
            return Err(AppError::conflict("优惠券已使用或已过期"));
        }

        let coupon = Coupon::select_by_id(tx, uc.coupon_id)
            .await?
            .ok_or_else(|| AppError::not_found("优惠券模板不存在"))?;
        if coupon.status != Coupon::STATUS_ENABLED {
            return Err(AppError::conflict("优惠券已停用"));
        }

        let now_ms = DateTime::now().unix_timestamp_millis();
        if let Some(start) = &coupon.start_time {
            if now_ms < start.unix_timestamp_millis() {
                return Err(AppError::conflict("优惠券未到可用时间"));
            }
        }
        if let Some(end) = &coupon.end_time {
            if now_ms > end.unix_timestamp_millis() {
                return Err(AppError::conflict("优惠券已过期"));
            }
        }
        // 门店券只能用于该门店订单
        if !applies_to_store(coupon.store_id, order_store_id) {
            return Err(AppError::conflict("优惠券不适用于该门店"));
        }

        compute_discount(coupon.coupon_type, coupon.amount, coupon.min_amount, total)
    }

    /// 核销：订单事务内原子置为已使用
    pub async fn mark_used(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        user_coupon_id: i64,
        order_id: i64,
    ) -> AppResult<()> {
        let res = tx
            .exec(
                "update user_coupons set status = ?, order_id = ?, used_at = now() \
                 where id = ? and status = ?",
                vec![
                    rbs::value!(UserCoupon::STATUS_USED),
                    rbs::value!(order_id),
                    rbs::value!(user_coupon_id),
                    rbs::value!(UserCoupon::STATUS_UNUSED),
                ],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::conflict("优惠券已被使用"));
        }
        Ok(())
    }

    /// 取消订单时退券
    pub async fn release(
        &self,
        tx: &mut RBatisTxExecutorGuard,
        user_coupon_id: i64,
    ) -> AppResult<()> {
        tx.exec(
            "update user_coupons set status = ?, order_id = null, used_at = null \
             where id = ? and status = ?",
            vec![
                rbs::value!(UserCoupon::STATUS_UNUSED),
                rbs::value!(user_coupon_id),
                rbs::value!(UserCoupon::STATUS_USED),
            ],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn threshold_coupon_requires_min_amount() {
        // 满 80 减 30
        assert_eq!(
            compute_discount(Coupon::TYPE_THRESHOLD, d("30"), d("80"), d("100")).unwrap(),
            d("30")
        );
        assert!(compute_discount(Coupon::TYPE_THRESHOLD, d("30"), d("80"), d("79.99")).is_err());
    }

    #[test]
    fn fixed_coupon_caps_at_total() {
        assert_eq!(
            compute_discount(Coupon::TYPE_FIXED, d("50"), Decimal::ZERO, d("30")).unwrap(),
            d("30")
        );
    }

    #[test]
    fn min_amount_guards_every_coupon_type() {
        // 门槛 80，总额 50：三种券型都不可用
        assert!(compute_discount(Coupon::TYPE_FIXED, d("10"), d("80"), d("50")).is_err());
        assert!(compute_discount(Coupon::TYPE_PERCENTAGE, d("90"), d("80"), d("50")).is_err());
        assert!(compute_discount(Coupon::TYPE_THRESHOLD, d("30"), d("80"), d("50")).is_err());
        // 恰好达到门槛可用
        assert_eq!(
            compute_discount(Coupon::TYPE_FIXED, d("10"), d("80"), d("80")).unwrap(),
            d("10")
        );
    }

    #[test]
    fn store_coupon_only_applies_to_its_store() {
        assert!(applies_to_store(0, 3));
        assert!(applies_to_store(3, 3));
        assert!(!applies_to_store(3, 5));
    }

    #[test]
    fn percentage_coupon_bankers_rounding() {
        // 九折：100 * (1 - 90/100) = 10.00
        assert_eq!(
            compute_discount(Coupon::TYPE_PERCENTAGE, d("90"), Decimal::ZERO, d("100")).unwrap(),
            d("10.00")
        );
        // 0.125 中点取偶 -> 0.12
        assert_eq!(
            compute_discount(Coupon::TYPE_PERCENTAGE, d("99"), Decimal::ZERO, d("12.50"))
                .unwrap()
                .to_string(),
            "0.12"
        );
        assert!(compute_discount(Coupon::TYPE_PERCENTAGE, d("120"), Decimal::ZERO, d("10")).is_err());
    }

    #[test]
    fn unknown_type_rejected() {
        assert!(compute_discount(9, d("1"), Decimal::ZERO, d("10")).is_err());
    }
}
