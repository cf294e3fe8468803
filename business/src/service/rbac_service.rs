use common::{AppError, AppResult};
use orm::entities::rbac::{Permission, Role};
use rbatis::executor::Executor;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use std::sync::Arc;

use super::perm_service::PermService;

/// RBAC 管理操作
///
/// 所有变更在事务提交前完成缓存失效；提交失败时缓存残留在 TTL 内自愈。
pub struct RbacService {
    rb: Arc<RBatis>,
    perm_service: Arc<PermService>,
}

/// 权限名必须是 module:action，小写字母数字与连字符/下划线
pub fn valid_permission_name(name: &str) -> bool {
    let mut parts = name.split(':');
    let (Some(module), Some(action), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let ok = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    };
    ok(module) && ok(action)
}

impl RbacService {
    pub fn new(rb: Arc<RBatis>, perm_service: Arc<PermService>) -> Self {
        Self { rb, perm_service }
    }

    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(Role::select_all(self.rb.as_ref()).await?)
    }

    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(Permission::select_all(self.rb.as_ref()).await?)
    }

    pub async fn create_role(&self, name: &str, display_name: Option<String>) -> AppResult<Role> {
        if name.trim().is_empty() {
            return Err(AppError::invalid_param("角色名不能为空"));
        }
        if Role::select_by_name(self.rb.as_ref(), name).await?.is_some() {
            return Err(AppError::conflict("角色已存在"));
        }
        let role = Role {
            id: None,
            name: name.to_string(),
            display_name,
            create_time: Some(DateTime::now()),
        };
        let mut tx = self.begin().await?;
        let res = Role::insert(&tx, &role).await?;
        self.perm_service.invalidate_all().await?;
        tx.commit().await?;
        Ok(Role {
            id: res.last_insert_id.as_i64(),
            ..role
        })
    }

    pub async fn delete_role(&self, role_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let res = tx
            .exec("delete from roles where id = ?", vec![rbs::value!(role_id)])
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("角色不存在"));
        }
        tx.exec(
            "delete from role_permissions where role_id = ?",
            vec![rbs::value!(role_id)],
        )
        .await?;
        tx.exec(
            "delete from user_roles where role_id = ?",
            vec![rbs::value!(role_id)],
        )
        .await?;
        self.perm_service.invalidate_all().await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn create_permission(&self, name: &str) -> AppResult<Permission> {
        if !valid_permission_name(name) {
            return Err(AppError::invalid_param("权限名必须是 module:action 形式"));
        }
        if Permission::select_by_name(self.rb.as_ref(), name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("权限已存在"));
        }
        let (module, action) = name.split_once(':').unwrap_or((name, ""));
        let permission = Permission {
            id: None,
            name: name.to_string(),
            display_name: None,
            module: Some(module.to_string()),
            action: Some(action.to_string()),
            create_time: Some(DateTime::now()),
        };
        let mut tx = self.begin().await?;
        let res = Permission::insert(&tx, &permission).await?;
        self.perm_service.invalidate_all().await?;
        tx.commit().await?;
        Ok(Permission {
            id: res.last_insert_id.as_i64(),
            ..permission
        })
    }

    pub async fn delete_permission(&self, permission_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        let res = tx
            .exec(
                "delete from permissions where id = ?",
                vec![rbs::value!(permission_id)],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("权限不存在"));
        }
        tx.exec(
            "delete from role_permissions where permission_id = ?",
            vec![rbs::value!(permission_id)],
        )
        .await?;
        self.perm_service.invalidate_all().await?;
        tx.commit().await?;
        Ok(())
    }

    /// 为角色授予权限，失效该角色下的所有用户
    pub async fn assign_permission(&self, role_id: i64, permission_id: i64) -> AppResult<()> {
        self.ensure_role(role_id).await?;
        self.ensure_permission(permission_id).await?;
        let mut tx = self.begin().await?;
        tx.exec(
            "insert ignore into role_permissions (role_id, permission_id) values (?, ?)",
            vec![rbs::value!(role_id), rbs::value!(permission_id)],
        )
        .await?;
        self.perm_service.invalidate_role(role_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn revoke_permission(&self, role_id: i64, permission_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        tx.exec(
            "delete from role_permissions where role_id = ? and permission_id = ?",
            vec![rbs::value!(role_id), rbs::value!(permission_id)],
        )
        .await?;
        self.perm_service.invalidate_role(role_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// 批量授予，单次扫描失效该角色的用户
    pub async fn bulk_assign_permissions(
        &self,
        role_id: i64,
        permission_ids: &[i64],
    ) -> AppResult<()> {
        self.ensure_role(role_id).await?;
        let mut tx = self.begin().await?;
        for pid in permission_ids {
            tx.exec(
                "insert ignore into role_permissions (role_id, permission_id) values (?, ?)",
                vec![rbs::value!(role_id), rbs::value!(*pid)],
            )
            .await?;
        }
        self.perm_service.invalidate_role(role_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// 用户-角色绑定只失效该用户
    pub async fn assign_role(&self, user_id: i64, role_id: i64) -> AppResult<()> {
        self.ensure_role(role_id).await?;
        let mut tx = self.begin().await?;
        tx.exec(
            "insert ignore into user_roles (user_id, role_id) values (?, ?)",
            vec![rbs::value!(user_id), rbs::value!(role_id)],
        )
        .await?;
        self.perm_service.invalidate_user(user_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn revoke_role(&self, user_id: i64, role_id: i64) -> AppResult<()> {
        let mut tx = self.begin().await?;
        tx.exec(
            "delete from user_roles where user_id = ? and role_id = ?",
            vec![rbs::value!(user_id), rbs::value!(role_id)],
        )
        .await?;
        self.perm_service.invalidate_user(user_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn role_permissions(&self, role_id: i64) -> AppResult<Vec<Permission>> {
        Ok(self
            .rb
            .query_decode(
                "select p.* from permissions p \
                 join role_permissions rp on rp.permission_id = p.id \
                 where rp.role_id = ?",
                vec![rbs::value!(role_id)],
            )
            .await?)
    }

    pub async fn user_roles(&self, user_id: i64) -> AppResult<Vec<Role>> {
        Ok(self
            .rb
            .query_decode(
                "select r.* from roles r \
                 join user_roles ur on ur.role_id = r.id \
                 where ur.user_id = ?",
                vec![rbs::value!(user_id)],
            )
            .await?)
    }

    async fn ensure_role(&self, role_id: i64) -> AppResult<()> {
        Role::select_by_id(self.rb.as_ref(), role_id)
            .await?
            .ok_or_else(|| AppError::not_found("角色不存在"))?;
        Ok(())
    }

    async fn ensure_permission(&self, permission_id: i64) -> AppResult<()> {
        Permission::select_by_id(self.rb.as_ref(), permission_id)
            .await?
            .ok_or_else(|| AppError::not_found("权限不存在"))?;
        Ok(())
    }

    async fn begin(&self) -> AppResult<rbatis::executor::RBatisTxExecutorGuard> {
        Ok(self
            .rb
            .acquire_begin()
            .await?
            .defer_async(|mut tx| async move {
                if !tx.done() {
                    let _ = tx.rollback().await;
                }
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_name_format() {
        assert!(valid_permission_name("accrual:run"));
        assert!(valid_permission_name("order:admin-cancel"));
        assert!(valid_permission_name("with_draw:review"));
        assert!(!valid_permission_name("Accrual:run"));
        assert!(!valid_permission_name("accrual"));
        assert!(!valid_permission_name("a:b:c"));
        assert!(!valid_permission_name(":run"));
        assert!(!valid_permission_name("run:"));
    }
}
