//! Redis 工具类 - 封装 deadpool-redis 连接池
//!
//! 权限缓存、分布式锁（SET NX EX）与消息流都经由此处

use deadpool_redis::{redis::cmd, Config, Connection, Pool, Runtime};

use crate::error::AppError;

#[derive(Clone)]
pub struct RedisUtil {
    pool: Pool,
}

impl RedisUtil {
    /// 从 URL 创建 Redis 连接池
    pub fn from_url(url: impl Into<String>) -> Result<Self, AppError> {
        let cfg = Config::from_url(url.into());
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AppError::Redis(format!("创建 Redis 连接池失败: {}", e)))?;
        Ok(RedisUtil { pool })
    }

    async fn conn(&self) -> Result<Connection, AppError> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::Redis(format!("获取 Redis 连接失败: {}", e)))
    }

    /// GET
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn().await?;
        let v: Option<String> = cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(AppError::from)?;
        Ok(v)
    }

    /// SETEX - 设置带过期时间的键值（秒）
    pub async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), AppError> {
        let mut conn = self.conn().await?;
        cmd("SETEX")
            .arg(key)
            .arg(seconds)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// SET key value NX EX seconds - 原子取锁
    /// 返回 true 表示取锁成功，false 表示键已存在
    pub async fn set_nx_ex(&self, key: &str, value: &str, seconds: u64) -> Result<bool, AppError> {
        let mut conn = self.conn().await?;
        let result: Option<String> = cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(AppError::from)?;
        Ok(result.is_some())
    }

    /// DEL
    pub async fn del(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn().await?;
        cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    /// 按模式删除（SCAN 游标遍历，避免 KEYS 阻塞）
    pub async fn del_pattern(&self, pattern: &str) -> Result<u64, AppError> {
        let mut conn = self.conn().await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(AppError::from)?;
            if !keys.is_empty() {
                let mut del = cmd("DEL");
                for k in &keys {
                    del.arg(k);
                }
                let n: u64 = del.query_async(&mut conn).await.map_err(AppError::from)?;
                deleted += n;
            }
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(deleted)
    }

    /// XADD - 向消息流追加一条记录
    pub async fn xadd(&self, stream: &str, fields: &[(&str, &str)]) -> Result<String, AppError> {
        let mut conn = self.conn().await?;
        let mut c = cmd("XADD");
        c.arg(stream).arg("*");
        for (k, v) in fields {
            c.arg(*k).arg(*v);
        }
        let id: String = c.query_async(&mut conn).await.map_err(AppError::from)?;
        Ok(id)
    }
}
