use actix_web::{get, web, Responder};
use common::response::{PageR, R};
use common::AppError;
use orm::entities::catalog::{Category, Product, Store, StoreProduct};

use crate::models::PageQuery;
use crate::state::AppState;

#[get("/api/v1/categories")]
pub async fn categories(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    R::success(Category::select_enabled(state.rb.as_ref()).await?)
}

#[get("/api/v1/products")]
pub async fn products(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let total: u64 = state
        .rb
        .query_decode("select count(*) from products where status = 1", vec![])
        .await?;
    let rows = Product::select_on_sale(state.rb.as_ref(), query.offset(), query.limit()).await?;
    PageR::success(rows, total, query.page, query.limit())
}

#[get("/api/v1/products/{id}")]
pub async fn product_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let product = Product::select_by_id(state.rb.as_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("商品不存在"))?;
    R::success(product)
}

#[get("/api/v1/stores")]
pub async fn stores(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    R::success(Store::select_open(state.rb.as_ref()).await?)
}

/// 门店在售商品（含门店价与门店库存）
#[get("/api/v1/stores/{id}/products")]
pub async fn store_products(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let store_id = path.into_inner();
    Store::select_by_id(state.rb.as_ref(), store_id)
        .await?
        .ok_or_else(|| AppError::not_found("门店不存在"))?;
    R::success(StoreProduct::select_by_store(state.rb.as_ref(), store_id).await?)
}
