use common::constants::perm;
use common::{AppError, AppResult, RedisUtil};
use rbatis::RBatis;
use std::collections::HashSet;
use std::sync::Arc;

use crate::middleware::auth::Identity;

/// RBAC 权限解析器
///
/// 缓存命中即权威，不回源比对；权限变更只有显式失效后可见。
pub struct PermService {
    rb: Arc<RBatis>,
    redis: Arc<RedisUtil>,
    ttl_secs: u64,
}

impl PermService {
    pub fn new(rb: Arc<RBatis>, redis: Arc<RedisUtil>, ttl_secs: u64) -> Self {
        Self { rb, redis, ttl_secs }
    }

    /// 解析用户权限集合（读穿缓存）
    pub async fn permissions_of(&self, user_id: i64) -> AppResult<HashSet<String>> {
        let key = perm::user_key(user_id);
        if let Some(cached) = self.redis.get(&key).await? {
            let names: Vec<String> = serde_json::from_str(&cached)?;
            return Ok(normalize(names));
        }

        let names: Vec<String> = self
            .rb
            .query_decode(
                "select p.name from permissions p \
                 join role_permissions rp on rp.permission_id = p.id \
                 join user_roles ur on ur.role_id = rp.role_id \
                 where ur.user_id = ?",
                vec![rbs::value!(user_id)],
            )
            .await?;

        self.redis
            .set_ex(&key, &serde_json::to_string(&names)?, self.ttl_secs)
            .await?;
        Ok(normalize(names))
    }

    /// 权限闸门：admin 角色直通，其余查集合
    pub async fn require(&self, identity: &Identity, permission: &str) -> AppResult<()> {
        if identity.is_admin() {
            return Ok(());
        }
        if self.permissions_of(identity.user_id).await?.contains(permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("缺少权限: {}", permission)))
        }
    }

    /// 失效单个用户
    pub async fn invalidate_user(&self, user_id: i64) -> AppResult<()> {
        self.redis.del(&perm::user_key(user_id)).await
    }

    /// 失效持有某角色的全部用户
    pub async fn invalidate_role(&self, role_id: i64) -> AppResult<()> {
        let user_ids: Vec<i64> = self
            .rb
            .query_decode(
                "select user_id from user_roles where role_id = ?",
                vec![rbs::value!(role_id)],
            )
            .await?;
        for uid in user_ids {
            self.redis.del(&perm::user_key(uid)).await?;
        }
        Ok(())
    }

    /// 全量失效
    pub async fn invalidate_all(&self) -> AppResult<u64> {
        self.redis.del_pattern(perm::USER_PATTERN).await
    }
}

/// 权限名统一小写去重
fn normalize(names: Vec<String>) -> HashSet<String> {
    names.into_iter().map(|n| n.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_dedups() {
        let set = normalize(vec![
            "Order:Manage".to_string(),
            "order:manage".to_string(),
            "rbac:manage".to_string(),
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("order:manage"));
        assert!(set.contains("rbac:manage"));
    }
}
