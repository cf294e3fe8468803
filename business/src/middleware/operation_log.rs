use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web::BytesMut,
    Error, HttpMessage,
};
use common::config::ObservabilityConfig;
use futures_util::future::{ready, Ready};
use futures_util::StreamExt;
use orm::entities::log::OperationLog;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use super::auth::Identity;
use super::request_id::RequestId;

const BODY_LIMIT: usize = 2000;

/// 操作日志
///
/// 只审计配置前缀下的写操作；日志落库成功后才返回响应。
#[derive(Clone)]
pub struct OperationLogMiddleware {
    rb: Arc<RBatis>,
    cfg: Arc<ObservabilityConfig>,
}

impl OperationLogMiddleware {
    pub fn new(rb: Arc<RBatis>, cfg: ObservabilityConfig) -> Self {
        Self {
            rb,
            cfg: Arc::new(cfg),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OperationLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = OperationLogMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OperationLogMiddlewareService {
            service: Rc::new(service),
            rb: self.rb.clone(),
            cfg: self.cfg.clone(),
        }))
    }
}

pub struct OperationLogMiddlewareService<S> {
    service: Rc<S>,
    rb: Arc<RBatis>,
    cfg: Arc<ObservabilityConfig>,
}

impl<S, B> Service<ServiceRequest> for OperationLogMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let rb = self.rb.clone();
        let cfg = self.cfg.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            let method = req.method().to_string();
            let is_mutation = matches!(method.as_str(), "POST" | "PUT" | "DELETE");
            let included = cfg.oplog_include_prefixes.iter().any(|p| path.starts_with(p))
                && !cfg.oplog_exclude_prefixes.iter().any(|p| path.starts_with(p));

            if !(is_mutation && included) {
                return service.call(req).await;
            }

            // 读出请求体再放回，供审计记录
            let mut buf = BytesMut::new();
            let mut payload = req.take_payload();
            while let Some(chunk) = payload.next().await {
                buf.extend_from_slice(&chunk?);
            }
            let body_bytes = buf.freeze();
            let (_, mut replay) = actix_http::h1::Payload::create(true);
            replay.unread_data(body_bytes.clone());
            req.set_payload(actix_web::dev::Payload::from(replay));

            let res = service.call(req).await?;

            let request_id = res
                .request()
                .extensions()
                .get::<RequestId>()
                .map(|r| r.0.clone())
                .unwrap_or_default();
            let user_id = res
                .request()
                .extensions()
                .get::<Identity>()
                .map(|i| i.user_id);
            let body = String::from_utf8_lossy(&body_bytes);
            let body = if body.is_empty() {
                None
            } else {
                Some(body.chars().take(BODY_LIMIT).collect::<String>())
            };

            let row = OperationLog {
                id: None,
                request_id,
                user_id,
                module: classify_module(&path).to_string(),
                method,
                path,
                body,
                status: res.status().as_u16() as i32,
                create_time: Some(DateTime::now()),
            };
            // 敏感操作要求审计先持久化，再对外确认
            if let Err(e) = OperationLog::insert(rb.as_ref(), &row).await {
                log::error!("操作日志落库失败: {}", e);
                return Err(common::AppError::from(e).into());
            }

            Ok(res)
        })
    }
}

fn classify_module(path: &str) -> &'static str {
    if path.contains("/admin/rbac") {
        OperationLog::MODULE_RBAC
    } else if path.contains("/admin/finance") || path.contains("/admin/accrual") {
        OperationLog::MODULE_FINANCE
    } else {
        OperationLog::MODULE_ADMIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_classification_by_path() {
        assert_eq!(classify_module("/api/v1/admin/rbac/roles"), "rbac");
        assert_eq!(classify_module("/api/v1/admin/finance/summary"), "finance");
        assert_eq!(classify_module("/api/v1/admin/accrual/run"), "finance");
        assert_eq!(classify_module("/api/v1/admin/stores/1/products"), "admin");
    }
}
