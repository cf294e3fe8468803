use actix_web::{get, post, web, Responder};
use chrono::Local;
use common::response::R;
use common::AppError;

use crate::middleware::auth::Identity;
use crate::models::{AccrualRunReq, DateQuery, ReverseOrderReq};
use crate::state::AppState;

const PERM_ACCRUAL: &str = "accrual:run";
const PERM_FINANCE: &str = "finance:manage";

fn resolve_date(date: Option<&str>) -> Result<String, AppError> {
    match date {
        None => Ok(Local::now().format("%Y-%m-%d").to_string()),
        Some(s) => {
            if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                return Err(AppError::invalid_param("日期格式必须是 yyyy-mm-dd"));
            }
            Ok(s.to_string())
        }
    }
}

/// 手工触发当日（或指定日）计息
#[post("/api/v1/admin/accrual/run")]
pub async fn accrual_run(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<AccrualRunReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_ACCRUAL).await?;
    let date = resolve_date(req.date.as_deref())?;
    R::success(
        state
            .interest_engine
            .run_for_date(state.rb.as_ref(), &date)
            .await?,
    )
}

#[get("/api/v1/admin/accrual/summary")]
pub async fn accrual_summary(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<DateQuery>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_ACCRUAL).await?;
    let date = resolve_date(query.date.as_deref())?;
    R::success(
        state
            .interest_engine
            .summary_for_date(state.rb.as_ref(), &date)
            .await?,
    )
}

/// 计息明细导出
#[get("/api/v1/admin/accrual/export")]
pub async fn accrual_export(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<DateQuery>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_ACCRUAL).await?;
    let date = resolve_date(query.date.as_deref())?;
    R::success(
        state
            .interest_engine
            .records_for_date(state.rb.as_ref(), &date)
            .await?,
    )
}

/// 佣金账本全局汇总
#[get("/api/v1/admin/finance/summary")]
pub async fn finance_summary(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_FINANCE).await?;
    R::success(
        state
            .commission_engine
            .ledger_summary(state.rb.as_ref(), None)
            .await?,
    )
}

/// 对账差异清单
#[get("/api/v1/admin/finance/reconcile/diff")]
pub async fn reconcile_diff(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_FINANCE).await?;
    R::success(
        state
            .commission_engine
            .reconcile_diff(state.rb.as_ref())
            .await?,
    )
}

/// 手工触发到期佣金释放
#[post("/api/v1/admin/finance/commission/release")]
pub async fn commission_release(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_FINANCE).await?;
    let batch = state.config.finance.commission_release.batch_size;
    R::success(
        state
            .commission_engine
            .release_due(state.rb.as_ref(), batch)
            .await?,
    )
}

/// 手工整单冲正（退款链路外的兜底操作）
#[post("/api/v1/admin/finance/commission/reverse-order")]
pub async fn commission_reverse_order(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<ReverseOrderReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_FINANCE).await?;
    let mut tx = state
        .rb
        .acquire_begin()
        .await?
        .defer_async(|mut tx| async move {
            if !tx.done() {
                let _ = tx.rollback().await;
            }
        });
    let reversed = state
        .commission_engine
        .reverse_for_order(&mut tx, req.order_id)
        .await?;
    tx.commit().await?;
    R::success(reversed)
}
