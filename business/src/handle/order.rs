use actix_web::{get, post, web, Responder};
use common::response::{PageR, R};
use common::AppError;
use serde_json::json;

use crate::middleware::auth::Identity;
use crate::models::{AdminOrderQuery, CancelOrderReq, CreateOrderReq, OrderListQuery, RefundConfirmReq};
use crate::state::AppState;

#[post("/api/v1/orders/from-cart")]
pub async fn create_from_cart(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<CreateOrderReq>,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .order_service
            .create_from_cart(&identity, &req.into_inner())
            .await?,
    )
}

#[get("/api/v1/orders")]
pub async fn my_orders(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<OrderListQuery>,
) -> Result<impl Responder, AppError> {
    let size = query.size.clamp(1, 100);
    let offset = query.page.saturating_sub(1) * size;
    let rows = state
        .order_service
        .my_orders(identity.user_id, query.status, offset, size)
        .await?;
    let total: u64 = match query.status {
        Some(s) => {
            state
                .rb
                .query_decode(
                    "select count(*) from orders where user_id = ? and status = ?",
                    vec![rbs::value!(identity.user_id), rbs::value!(s)],
                )
                .await?
        }
        None => {
            state
                .rb
                .query_decode(
                    "select count(*) from orders where user_id = ?",
                    vec![rbs::value!(identity.user_id)],
                )
                .await?
        }
    };
    PageR::success(rows, total, query.page, size)
}

#[get("/api/v1/orders/{id}")]
pub async fn detail(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let (order, items) = state
        .order_service
        .detail(&identity, path.into_inner())
        .await?;
    R::success(json!({ "order": order, "items": items }))
}

/// 对订单发起支付（默认支付方式）
#[post("/api/v1/orders/{id}/pay")]
pub async fn pay(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .payment_service
            .unified_order(identity.user_id, path.into_inner(), None)
            .await?,
    )
}

#[post("/api/v1/orders/{id}/cancel")]
pub async fn cancel(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<CancelOrderReq>,
) -> Result<impl Responder, AppError> {
    state
        .order_service
        .cancel(identity.user_id, path.into_inner(), req.reason.clone())
        .await?;
    R::ok()
}

#[post("/api/v1/orders/{id}/receive")]
pub async fn receive(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state
        .order_service
        .receive(identity.user_id, path.into_inner())
        .await?;
    R::ok()
}

/// 门店发货（仅配送单）
#[post("/api/v1/orders/{id}/deliver")]
pub async fn deliver(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.order_service.deliver(&identity, path.into_inner()).await?;
    R::ok()
}

/// 门店/管理端完成订单
#[post("/api/v1/orders/{id}/complete")]
pub async fn complete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.order_service.complete(&identity, path.into_inner()).await?;
    R::ok()
}

#[post("/api/v1/orders/{id}/admin-cancel")]
pub async fn admin_cancel(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<CancelOrderReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, "order:manage").await?;
    state
        .order_service
        .admin_cancel(&identity, path.into_inner(), req.reason.clone())
        .await?;
    R::ok()
}

#[post("/api/v1/orders/{id}/refund/start")]
pub async fn refund_start(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<CancelOrderReq>,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .order_service
            .refund_start(&identity, path.into_inner(), req.reason.clone())
            .await?,
    )
}

/// 外部退款结果回传（管理端确认）
#[post("/api/v1/orders/{id}/refund/confirm")]
pub async fn refund_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<RefundConfirmReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, "order:manage").await?;
    state
        .order_service
        .refund_confirm(path.into_inner(), &req.refund_no, req.success)
        .await?;
    R::ok()
}

/// 门店订单列表
#[get("/api/v1/store/{id}/orders")]
pub async fn store_orders(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    query: web::Query<OrderListQuery>,
) -> Result<impl Responder, AppError> {
    let size = query.size.clamp(1, 100);
    let offset = query.page.saturating_sub(1) * size;
    let store_id = path.into_inner();
    let rows = state
        .order_service
        .store_orders(&identity, store_id, offset, size)
        .await?;
    let total: u64 = state
        .rb
        .query_decode(
            "select count(*) from orders where store_id = ?",
            vec![rbs::value!(store_id)],
        )
        .await?;
    PageR::success(rows, total, query.page, size)
}

/// 门店经营统计
#[get("/api/v1/store/{id}/stats")]
pub async fn store_stats(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .order_service
            .store_stats(&identity, path.into_inner())
            .await?,
    )
}

/// 管理端订单列表（支持门店/状态/时间窗筛选）
#[get("/api/v1/admin/orders")]
pub async fn admin_orders(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<AdminOrderQuery>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, "order:manage").await?;
    let query = query.into_inner();
    let (rows, total) = state.order_service.admin_orders(&query).await?;
    PageR::success(rows, total, query.page, query.size.clamp(1, 100))
}
