use actix_web::{get, post, web, Responder};
use common::response::{PageR, R};
use common::AppError;
use orm::entities::referral::Commission;

use crate::middleware::auth::Identity;
use crate::models::{BindReferralReq, PageQuery};
use crate::state::AppState;

#[post("/api/v1/referrals/bind")]
pub async fn bind(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<BindReferralReq>,
) -> Result<impl Responder, AppError> {
    state
        .referral_service
        .bind(identity.user_id, req.referrer_id)
        .await?;
    R::ok()
}

#[get("/api/v1/referrals/team")]
pub async fn team(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    R::success(state.referral_service.direct_team(identity.user_id).await?)
}

/// 我的佣金流水
#[get("/api/v1/referrals/commissions")]
pub async fn commissions(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let rows = Commission::select_by_user(
        state.rb.as_ref(),
        identity.user_id,
        query.offset(),
        query.limit(),
    )
    .await?;
    let total: u64 = state
        .rb
        .query_decode(
            "select count(*) from commissions where user_id = ?",
            vec![rbs::value!(identity.user_id)],
        )
        .await?;
    PageR::success(rows, total, query.page, query.limit())
}

/// 我的佣金账本汇总（冻结/可用/已提现/已冲正）
#[get("/api/v1/referrals/summary")]
pub async fn summary(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .commission_engine
            .ledger_summary(state.rb.as_ref(), Some(identity.user_id))
            .await?,
    )
}
