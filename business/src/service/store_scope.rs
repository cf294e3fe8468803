use common::{AppError, AppResult};
use orm::entities::catalog::StoreAdmin;
use rbatis::RBatis;

use crate::middleware::auth::Identity;

/// 门店作用域闸门
///
/// store 角色只能操作自己映射的门店，admin 不受限。
pub async fn assert_store_scope(rb: &RBatis, identity: &Identity, store_id: i64) -> AppResult<()> {
    if identity.is_admin() {
        return Ok(());
    }
    if !identity.is_store() {
        return Err(AppError::forbidden("仅门店账号可执行该操作"));
    }
    let mapping = StoreAdmin::select_by_user_id(rb, identity.user_id)
        .await?
        .ok_or_else(|| AppError::forbidden("账号未绑定门店"))?;
    if mapping.store_id != store_id {
        return Err(AppError::forbidden("无权操作其他门店"));
    }
    Ok(())
}

/// 取 store 角色账号绑定的门店
pub async fn store_of(rb: &RBatis, identity: &Identity) -> AppResult<Option<i64>> {
    if !identity.is_store() {
        return Ok(None);
    }
    Ok(StoreAdmin::select_by_user_id(rb, identity.user_id)
        .await?
        .map(|m| m.store_id))
}
