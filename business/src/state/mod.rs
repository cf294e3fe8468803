use std::sync::Arc;

use common::mq::message_queue::MessageQueue;
use common::{AppConfig, RedisUtil};
use finance::{CommissionEngine, InterestEngine, WithdrawEngine};
use rbatis::RBatis;

use crate::service::cart_service::CartService;
use crate::service::coupon_service::CouponService;
use crate::service::order_service::OrderService;
use crate::service::payment_service::PaymentService;
use crate::service::perm_service::PermService;
use crate::service::rbac_service::RbacService;
use crate::service::referral_service::ReferralService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rb: Arc<RBatis>,
    pub redis: Arc<RedisUtil>,
    pub mq: Arc<MessageQueue>,

    pub perm_service: Arc<PermService>,
    pub rbac_service: Arc<RbacService>,
    pub cart_service: Arc<CartService>,
    pub coupon_service: Arc<CouponService>,
    pub order_service: Arc<OrderService>,
    pub payment_service: Arc<PaymentService>,
    pub referral_service: Arc<ReferralService>,

    pub commission_engine: Arc<CommissionEngine>,
    pub interest_engine: Arc<InterestEngine>,
    pub withdraw_engine: Arc<WithdrawEngine>,
}
