use actix_web::{put, web, Responder};
use common::response::R;
use common::AppError;
use orm::entities::catalog::{Product, StoreProduct};

use crate::middleware::auth::Identity;
use crate::models::UpsertStoreProductReq;
use crate::service::store_scope;
use crate::state::AppState;

/// 门店上架/调整商品绑定（门店价、门店库存、经营类型）
#[put("/api/v1/store/{id}/products")]
pub async fn upsert_product(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<UpsertStoreProductReq>,
) -> Result<impl Responder, AppError> {
    let store_id = path.into_inner();
    store_scope::assert_store_scope(state.rb.as_ref(), &identity, store_id).await?;
    let req = req.into_inner();

    if req.stock < 0 {
        return Err(AppError::invalid_param("库存不能为负"));
    }
    if !(1..=3).contains(&req.biz_type) {
        return Err(AppError::invalid_param("经营类型不合法"));
    }
    Product::select_by_id(state.rb.as_ref(), req.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("商品不存在"))?;

    match StoreProduct::select_one(state.rb.as_ref(), store_id, req.product_id).await? {
        Some(existing) => {
            state
                .rb
                .exec(
                    "update store_products set stock = ?, price_override = ?, biz_type = ? \
                     where id = ?",
                    vec![
                        rbs::value!(req.stock),
                        rbs::value!(req.price_override),
                        rbs::value!(req.biz_type),
                        rbs::value!(existing.id.unwrap_or_default()),
                    ],
                )
                .await?;
            R::success(StoreProduct {
                stock: req.stock,
                price_override: req.price_override,
                biz_type: req.biz_type,
                ..existing
            })
        }
        None => {
            let binding = StoreProduct {
                id: None,
                store_id,
                product_id: req.product_id,
                stock: req.stock,
                price_override: req.price_override,
                biz_type: req.biz_type,
            };
            let res = StoreProduct::insert(state.rb.as_ref(), &binding).await?;
            R::success(StoreProduct {
                id: res.last_insert_id.as_i64(),
                ..binding
            })
        }
    }
}
