use actix_web::{get, post, web, Responder};
use common::response::{PageR, R};
use common::AppError;
use orm::entities::referral::WithdrawRecord;

use crate::middleware::auth::Identity;
use crate::models::{PageQuery, WithdrawApplyReq, WithdrawRejectReq};
use crate::service::store_scope;
use crate::state::AppState;

const PERM_REVIEW: &str = "withdrawal:review";

#[post("/api/v1/withdrawals/apply")]
pub async fn apply(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<WithdrawApplyReq>,
) -> Result<impl Responder, AppError> {
    let store_id = store_scope::store_of(state.rb.as_ref(), &identity).await?;
    R::success(
        state
            .withdraw_engine
            .apply(state.rb.as_ref(), identity.user_id, store_id, req.amount_cents)
            .await?,
    )
}

#[get("/api/v1/withdrawals")]
pub async fn mine(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let rows = WithdrawRecord::select_by_user(
        state.rb.as_ref(),
        identity.user_id,
        query.offset(),
        query.limit(),
    )
    .await?;
    let total: u64 = state
        .rb
        .query_decode(
            "select count(*) from withdraw_records where user_id = ?",
            vec![rbs::value!(identity.user_id)],
        )
        .await?;
    PageR::success(rows, total, query.page, query.limit())
}

/// 待审核列表
#[get("/api/v1/admin/withdrawals")]
pub async fn pending_list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_REVIEW).await?;
    let rows = WithdrawRecord::select_by_state(
        state.rb.as_ref(),
        WithdrawRecord::STATE_PENDING,
        query.offset(),
        query.limit(),
    )
    .await?;
    let total: u64 = state
        .rb
        .query_decode(
            "select count(*) from withdraw_records where state = ?",
            vec![rbs::value!(WithdrawRecord::STATE_PENDING)],
        )
        .await?;
    PageR::success(rows, total, query.page, query.limit())
}

#[post("/api/v1/admin/withdrawals/{id}/approve")]
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_REVIEW).await?;
    state
        .withdraw_engine
        .approve(state.rb.as_ref(), path.into_inner())
        .await?;
    R::ok()
}

#[post("/api/v1/admin/withdrawals/{id}/complete")]
pub async fn complete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_REVIEW).await?;
    state
        .withdraw_engine
        .complete(state.rb.as_ref(), path.into_inner())
        .await?;
    R::ok()
}

/// 驳回：已锁定的佣金恢复为可用
#[post("/api/v1/admin/withdrawals/{id}/reject")]
pub async fn reject(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<WithdrawRejectReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_REVIEW).await?;
    state
        .withdraw_engine
        .reject(state.rb.as_ref(), path.into_inner(), req.remark.clone())
        .await?;
    R::ok()
}
