use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use rbatis::RBatis;

use common::mq::message_queue::MessageQueue;

mod handle;
mod middleware;
mod models;
mod service;
mod state;

use common::{AppConfig, RedisUtil};
use finance::{CommissionEngine, InterestEngine, WithdrawEngine};
use middleware::access_log::AccessLogMiddleware;
use middleware::auth::AuthMiddleware;
use middleware::operation_log::OperationLogMiddleware;
use middleware::rate_limit::RateLimitMiddleware;
use middleware::request_id::RequestIdMiddleware;
use service::cart_service::CartService;
use service::coupon_service::CouponService;
use service::order_service::OrderService;
use service::payment_service::PaymentService;
use service::perm_service::PermService;
use service::rbac_service::RbacService;
use service::referral_service::ReferralService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 嵌入配置文件（编译时加载）
    const DEFAULT_CONFIG: &str = include_str!("../config.yaml");

    let config =
        AppConfig::from_file_or_embedded("business/config", DEFAULT_CONFIG).expect("配置加载失败");

    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动茶饮零售 API 服务...");

    let rb = RBatis::new();
    rb.link(rbdc_mysql::MysqlDriver {}, &config.database.url)
        .await
        .map_err(|e| {
            log::error!("数据库连接失败: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?;
    log::info!("数据库连接成功");
    let rb = Arc::new(rb);

    let redis_util = RedisUtil::from_url(config.redis.url.clone()).map_err(|e| {
        log::error!("Redis 初始化失败: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    let redis_util = Arc::new(redis_util);
    log::info!("Redis 连接池已就绪");

    let mq = Arc::new(MessageQueue::new(redis_util.clone()));
    let config = Arc::new(config);

    // 组装服务依赖
    let perm_service = Arc::new(PermService::new(
        rb.clone(),
        redis_util.clone(),
        config.finance.perm_cache_ttl_secs,
    ));
    let rbac_service = Arc::new(RbacService::new(rb.clone(), perm_service.clone()));
    let cart_service = Arc::new(CartService::new(rb.clone()));
    let coupon_service = Arc::new(CouponService::new(rb.clone()));
    let commission_engine = Arc::new(CommissionEngine::new(config.finance.partner.clone()));
    let interest_engine = Arc::new(InterestEngine::new(config.finance.accrual.clone()));
    let withdraw_engine = Arc::new(WithdrawEngine::new(config.finance.withdrawal.clone()));
    let order_service = Arc::new(OrderService::new(
        rb.clone(),
        coupon_service.clone(),
        commission_engine.clone(),
        mq.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        rb.clone(),
        config.clone(),
        commission_engine.clone(),
        mq.clone(),
    ));
    let referral_service = Arc::new(ReferralService::new(rb.clone()));

    let state = state::AppState {
        config: config.clone(),
        rb: rb.clone(),
        redis: redis_util,
        mq,
        perm_service,
        rbac_service,
        cart_service,
        coupon_service,
        order_service,
        payment_service,
        referral_service,
        commission_engine,
        interest_engine,
        withdraw_engine,
    };
    let state_data = web::Data::new(state);

    let auth_middleware = AuthMiddleware::new(config.jwt.clone(), rb.clone());
    let access_log_middleware = AccessLogMiddleware::new(rb.clone());
    let operation_log_middleware =
        OperationLogMiddleware::new(rb.clone(), config.observability.clone());
    let rate_limit_middleware = RateLimitMiddleware::new(
        vec![
            "/api/v1/user/login".to_string(),
            "/api/v1/payments/callback".to_string(),
        ],
        30,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("服务监听在: {}", addr);

    HttpServer::new(move || {
        // wrap 后注册的先执行：请求ID最外层，限流最内层
        App::new()
            .wrap(rate_limit_middleware.clone())
            .wrap(operation_log_middleware.clone())
            .wrap(auth_middleware.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(access_log_middleware.clone())
            .wrap(RequestIdMiddleware)
            .app_data(state_data.clone())
            // 用户
            .service(handle::user::login)
            .service(handle::user::dev_login)
            .service(handle::user::info)
            .service(handle::user::refresh)
            // 商品目录
            .service(handle::catalog::categories)
            .service(handle::catalog::products)
            .service(handle::catalog::product_detail)
            .service(handle::catalog::stores)
            .service(handle::catalog::store_products)
            // 购物车
            .service(handle::cart::list)
            .service(handle::cart::add_item)
            .service(handle::cart::update_item)
            .service(handle::cart::remove_item)
            .service(handle::cart::clear)
            // 订单
            .service(handle::order::create_from_cart)
            .service(handle::order::my_orders)
            .service(handle::order::detail)
            .service(handle::order::cancel)
            .service(handle::order::receive)
            .service(handle::order::deliver)
            .service(handle::order::complete)
            .service(handle::order::admin_cancel)
            .service(handle::order::refund_start)
            .service(handle::order::refund_confirm)
            .service(handle::order::pay)
            .service(handle::order::store_orders)
            .service(handle::order::store_stats)
            .service(handle::order::admin_orders)
            // 支付
            .service(handle::payment::unified_order)
            .service(handle::payment::callback)
            // 优惠券
            .service(handle::coupon::list)
            .service(handle::coupon::mine)
            .service(handle::coupon::create)
            .service(handle::coupon::grant)
            // 推荐与佣金
            .service(handle::referral::bind)
            .service(handle::referral::team)
            .service(handle::referral::commissions)
            .service(handle::referral::summary)
            // 门店管理
            .service(handle::store::upsert_product)
            // 提现
            .service(handle::withdraw::apply)
            .service(handle::withdraw::mine)
            .service(handle::withdraw::pending_list)
            .service(handle::withdraw::approve)
            .service(handle::withdraw::complete)
            .service(handle::withdraw::reject)
            // RBAC 管理
            .service(handle::rbac::list_roles)
            .service(handle::rbac::create_role)
            .service(handle::rbac::delete_role)
            .service(handle::rbac::list_permissions)
            .service(handle::rbac::create_permission)
            .service(handle::rbac::delete_permission)
            .service(handle::rbac::assign_permission)
            .service(handle::rbac::revoke_permission)
            .service(handle::rbac::bulk_assign)
            .service(handle::rbac::role_permissions)
            .service(handle::rbac::assign_role)
            .service(handle::rbac::revoke_role)
            .service(handle::rbac::user_roles)
            .service(handle::rbac::invalidate_cache)
            // 财务管理
            .service(handle::finance_admin::accrual_run)
            .service(handle::finance_admin::accrual_summary)
            .service(handle::finance_admin::accrual_export)
            .service(handle::finance_admin::finance_summary)
            .service(handle::finance_admin::reconcile_diff)
            .service(handle::finance_admin::commission_release)
            .service(handle::finance_admin::commission_reverse_order)
    })
    .bind(&addr)?
    .run()
    .await
}
