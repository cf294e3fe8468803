use actix_web::{post, web, HttpResponse, Responder};
use common::response::R;
use common::AppError;
use serde_json::Value;

use crate::middleware::auth::Identity;
use crate::models::UnifiedOrderReq;
use crate::state::AppState;

#[post("/api/v1/payments/unified-order")]
pub async fn unified_order(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<UnifiedOrderReq>,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .payment_service
            .unified_order(identity.user_id, req.order_id, req.method.clone())
            .await?,
    )
}

/// 支付方异步通知（契约要求返回纯文本 success）
#[post("/api/v1/payments/callback")]
pub async fn callback(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<impl Responder, AppError> {
    state.payment_service.handle_callback(&body).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("success"))
}
