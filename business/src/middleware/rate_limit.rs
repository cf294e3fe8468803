use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use common::AppError;
use futures_util::future::{ready, Ready};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 令牌桶限流（按客户端 IP，默认 30 次/分钟，仅作用于指定前缀）
#[derive(Clone)]
pub struct RateLimitMiddleware {
    prefixes: Arc<Vec<String>>,
    capacity: f64,
    refill_per_sec: f64,
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

impl RateLimitMiddleware {
    pub fn new(prefixes: Vec<String>, per_minute: u32) -> Self {
        let capacity = per_minute.max(1) as f64;
        Self {
            prefixes: Arc::new(prefixes),
            capacity,
            refill_per_sec: capacity / 60.0,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// 空闲超过该时长的桶令牌必然已满，可安全移除
const IDLE_EVICT: Duration = Duration::from_secs(120);

/// 清理长期无请求的桶，防止按 IP 的映射无界增长
fn evict_idle(map: &mut HashMap<String, Bucket>, now: Instant) {
    map.retain(|_, b| now.duration_since(b.last) < IDLE_EVICT);
}

/// 补充令牌并尝试消费一枚，返回是否放行
fn try_acquire(bucket: &mut Bucket, now: Instant, capacity: f64, refill_per_sec: f64) -> bool {
    let elapsed = now.duration_since(bucket.last).as_secs_f64();
    bucket.tokens = (bucket.tokens + elapsed * refill_per_sec).min(capacity);
    bucket.last = now;
    if bucket.tokens >= 1.0 {
        bucket.tokens -= 1.0;
        true
    } else {
        false
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            prefixes: self.prefixes.clone(),
            capacity: self.capacity,
            refill_per_sec: self.refill_per_sec,
            buckets: self.buckets.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    prefixes: Arc<Vec<String>>,
    capacity: f64,
    refill_per_sec: f64,
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let prefixes = self.prefixes.clone();
        let capacity = self.capacity;
        let refill_per_sec = self.refill_per_sec;
        let buckets = self.buckets.clone();

        Box::pin(async move {
            let path = req.path();
            if prefixes.iter().any(|p| path.starts_with(p)) {
                let ip = req
                    .connection_info()
                    .realip_remote_addr()
                    .unwrap_or("unknown")
                    .to_string();
                let now = Instant::now();
                let allowed = {
                    let mut map = buckets.lock().unwrap_or_else(|e| e.into_inner());
                    evict_idle(&mut map, now);
                    let bucket = map.entry(ip.clone()).or_insert(Bucket {
                        tokens: capacity,
                        last: now,
                    });
                    try_acquire(bucket, now, capacity, refill_per_sec)
                };
                if !allowed {
                    log::warn!("限流拦截: ip={} path={}", ip, path);
                    return Err(AppError::RateLimited.into());
                }
            }
            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn bucket_exhausts_then_refills() {
        let now = Instant::now();
        let mut bucket = Bucket {
            tokens: 2.0,
            last: now,
        };
        assert!(try_acquire(&mut bucket, now, 2.0, 0.5));
        assert!(try_acquire(&mut bucket, now, 2.0, 0.5));
        assert!(!try_acquire(&mut bucket, now, 2.0, 0.5));

        // 2 秒补充 1 枚
        let later = now + Duration::from_secs(2);
        assert!(try_acquire(&mut bucket, later, 2.0, 0.5));
    }

    #[test]
    fn idle_buckets_are_evicted_fresh_ones_kept() {
        let now = Instant::now();
        let mut map = HashMap::new();
        map.insert(
            "1.1.1.1".to_string(),
            Bucket {
                tokens: 0.0,
                last: now,
            },
        );
        map.insert(
            "2.2.2.2".to_string(),
            Bucket {
                tokens: 0.0,
                last: now + IDLE_EVICT,
            },
        );
        evict_idle(&mut map, now + IDLE_EVICT);
        assert!(!map.contains_key("1.1.1.1"));
        assert!(map.contains_key("2.2.2.2"));
    }

    #[test]
    fn bucket_never_exceeds_capacity() {
        let now = Instant::now();
        let mut bucket = Bucket {
            tokens: 1.0,
            last: now,
        };
        let much_later = now + Duration::from_secs(3600);
        assert!(try_acquire(&mut bucket, much_later, 30.0, 0.5));
        assert!(bucket.tokens <= 30.0);
    }
}
