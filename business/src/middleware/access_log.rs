use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ready, Ready};
use orm::entities::log::AccessLog;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use super::auth::Identity;
use super::request_id::RequestId;

/// 访问日志
///
/// 明细异步落库，不阻塞响应。
#[derive(Clone)]
pub struct AccessLogMiddleware {
    rb: Arc<RBatis>,
}

impl AccessLogMiddleware {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessLogMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogMiddlewareService {
            service: Rc::new(service),
            rb: self.rb.clone(),
        }))
    }
}

pub struct AccessLogMiddlewareService<S> {
    service: Rc<S>,
    rb: Arc<RBatis>,
}

impl<S, B> Service<ServiceRequest> for AccessLogMiddlewareService<S>
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
        let rb = self.rb.clone();

        Box::pin(async move {
            let started = Instant::now();
            let method = req.method().to_string();
            let path = req.path().to_string();
            let ip = req
                .connection_info()
                .realip_remote_addr()
                .map(str::to_string);

            let res = service.call(req).await?;

            let latency_ms = started.elapsed().as_millis() as i64;
            let status = res.status().as_u16() as i32;
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

            log::info!(
                "{} {} {} {}ms request_id={}",
                method,
                path,
                status,
                latency_ms,
                request_id
            );

            let row = AccessLog {
                id: None,
                request_id,
                method,
                path,
                status,
                user_id,
                ip,
                latency_ms,
                create_time: Some(DateTime::now()),
            };
            tokio::spawn(async move {
                if let Err(e) = AccessLog::insert(rb.as_ref(), &row).await {
                    log::warn!("访问日志落库失败: {}", e);
                }
            });

            Ok(res)
        })
    }
}
