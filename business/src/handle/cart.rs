use actix_web::{delete, get, post, put, web, Responder};
use common::response::R;
use common::AppError;

use crate::middleware::auth::Identity;
use crate::models::{AddCartItemReq, UpdateCartItemReq};
use crate::state::AppState;

#[get("/api/v1/cart")]
pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    R::success(state.cart_service.list(identity.user_id).await?)
}

#[post("/api/v1/cart/items")]
pub async fn add_item(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<AddCartItemReq>,
) -> Result<impl Responder, AppError> {
    R::success(
        state
            .cart_service
            .add_item(&identity, req.product_id, req.quantity)
            .await?,
    )
}

#[put("/api/v1/cart/items/{id}")]
pub async fn update_item(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    req: web::Json<UpdateCartItemReq>,
) -> Result<impl Responder, AppError> {
    state
        .cart_service
        .update_item(identity.user_id, path.into_inner(), req.quantity, req.selected)
        .await?;
    R::ok()
}

#[delete("/api/v1/cart/items/{id}")]
pub async fn remove_item(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state
        .cart_service
        .remove_item(identity.user_id, path.into_inner())
        .await?;
    R::ok()
}

#[delete("/api/v1/cart/clear")]
pub async fn clear(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    state.cart_service.clear(identity.user_id).await?;
    R::ok()
}
