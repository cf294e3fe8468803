use actix_web::{delete, get, post, web, Responder};
use common::response::R;
use common::AppError;

use crate::middleware::auth::Identity;
use crate::models::{
    BulkAssignReq, CreatePermissionReq, CreateRoleReq, InvalidateCacheReq, RolePermissionReq,
    UserRoleReq,
};
use crate::state::AppState;

const PERM_MANAGE: &str = "rbac:manage";

#[get("/api/v1/admin/rbac/roles")]
pub async fn list_roles(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    R::success(state.rbac_service.list_roles().await?)
}

#[post("/api/v1/admin/rbac/roles")]
pub async fn create_role(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<CreateRoleReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    R::success(
        state
            .rbac_service
            .create_role(&req.name, req.display_name.clone())
            .await?,
    )
}

#[delete("/api/v1/admin/rbac/roles/{id}")]
pub async fn delete_role(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state.rbac_service.delete_role(path.into_inner()).await?;
    R::ok()
}

#[get("/api/v1/admin/rbac/permissions")]
pub async fn list_permissions(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    R::success(state.rbac_service.list_permissions().await?)
}

#[post("/api/v1/admin/rbac/permissions")]
pub async fn create_permission(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<CreatePermissionReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    R::success(state.rbac_service.create_permission(&req.name).await?)
}

#[delete("/api/v1/admin/rbac/permissions/{id}")]
pub async fn delete_permission(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state.rbac_service.delete_permission(path.into_inner()).await?;
    R::ok()
}

#[post("/api/v1/admin/rbac/role-permissions/assign")]
pub async fn assign_permission(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<RolePermissionReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state
        .rbac_service
        .assign_permission(req.role_id, req.permission_id)
        .await?;
    R::ok()
}

#[post("/api/v1/admin/rbac/role-permissions/revoke")]
pub async fn revoke_permission(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<RolePermissionReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state
        .rbac_service
        .revoke_permission(req.role_id, req.permission_id)
        .await?;
    R::ok()
}

#[post("/api/v1/admin/rbac/role-permissions/bulk-assign")]
pub async fn bulk_assign(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<BulkAssignReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state
        .rbac_service
        .bulk_assign_permissions(req.role_id, &req.permission_ids)
        .await?;
    R::ok()
}

#[get("/api/v1/admin/rbac/roles/{id}/permissions")]
pub async fn role_permissions(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    R::success(state.rbac_service.role_permissions(path.into_inner()).await?)
}

#[post("/api/v1/admin/rbac/user-roles/assign")]
pub async fn assign_role(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<UserRoleReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state
        .rbac_service
        .assign_role(req.user_id, req.role_id)
        .await?;
    R::ok()
}

#[post("/api/v1/admin/rbac/user-roles/revoke")]
pub async fn revoke_role(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<UserRoleReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    state
        .rbac_service
        .revoke_role(req.user_id, req.role_id)
        .await?;
    R::ok()
}

#[get("/api/v1/admin/rbac/users/{id}/roles")]
pub async fn user_roles(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    R::success(state.rbac_service.user_roles(path.into_inner()).await?)
}

/// 显式缓存失效：单个用户或全量
#[post("/api/v1/admin/rbac/cache/invalidate")]
pub async fn invalidate_cache(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<InvalidateCacheReq>,
) -> Result<impl Responder, AppError> {
    state.perm_service.require(&identity, PERM_MANAGE).await?;
    if req.all {
        let removed = state.perm_service.invalidate_all().await?;
        return R::success(removed);
    }
    match req.user_id {
        Some(user_id) => {
            state.perm_service.invalidate_user(user_id).await?;
            R::success(1)
        }
        None => Err(AppError::invalid_param("user_id 与 all 必须二选一")),
    }
}
