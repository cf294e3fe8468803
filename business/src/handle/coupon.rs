use actix_web::{get, post, web, Responder};
use common::response::R;
use common::AppError;
use orm::entities::marketing::Coupon;
use rbatis::rbdc::datetime::DateTime;
use std::str::FromStr;

use crate::middleware::auth::Identity;
use crate::models::{CreateCouponReq, GrantCouponReq};
use crate::state::AppState;

#[get("/api/v1/coupons")]
pub async fn list(state: web::Data<AppState>, _identity: Identity) -> Result<impl Responder, AppError> {
    R::success(state.coupon_service.list_enabled().await?)
}

#[get("/api/v1/user/coupons")]
pub async fn mine(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    R::success(state.coupon_service.my_coupons(identity.user_id).await?)
}

#[post("/api/v1/admin/coupons")]
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<CreateCouponReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, "coupon:manage").await?;
    let req = req.into_inner();
    let coupon = Coupon {
        id: None,
        name: req.name,
        coupon_type: req.coupon_type,
        amount: req.amount,
        min_amount: req.min_amount,
        start_time: parse_time(req.start_time.as_deref())?,
        end_time: parse_time(req.end_time.as_deref())?,
        store_id: req.store_id,
        status: Coupon::STATUS_ENABLED,
        total_count: req.total_count,
        used_count: Some(0),
        create_time: Some(DateTime::now()),
    };
    R::success(state.coupon_service.create(coupon).await?)
}

#[post("/api/v1/admin/coupons/grant")]
pub async fn grant(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<GrantCouponReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, "coupon:manage").await?;
    R::success(
        state
            .coupon_service
            .grant(req.user_id, req.coupon_id)
            .await?,
    )
}

fn parse_time(value: Option<&str>) -> Result<Option<DateTime>, AppError> {
    match value {
        None => Ok(None),
        Some(s) => DateTime::from_str(s)
            .map(Some)
            .map_err(|_| AppError::invalid_param(format!("时间格式不合法: {}", s))),
    }
}
