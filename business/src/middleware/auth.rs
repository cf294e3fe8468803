use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use common::config::JwtConfig;
use common::utils::jwt;
use common::AppError;
use futures_util::future::{ready, Ready};
use orm::entities::user::User;
use rbatis::RBatis;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

/// 认证后的请求身份
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub open_id: String,
    pub role: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == User::ROLE_ADMIN
    }

    pub fn is_store(&self) -> bool {
        self.role == User::ROLE_STORE
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized("未登录").into()),
        )
    }
}

/// JWT 认证 + 账号状态闸门
///
/// 白名单用户放行一切状态限制；黑名单拒绝；禁用状态视同未授权。
#[derive(Clone)]
pub struct AuthMiddleware {
    jwt: Arc<JwtConfig>,
    rb: Arc<RBatis>,
    public_prefixes: Arc<Vec<String>>,
}

impl AuthMiddleware {
    pub fn new(jwt: JwtConfig, rb: Arc<RBatis>) -> Self {
        Self {
            jwt: Arc::new(jwt),
            rb,
            public_prefixes: Arc::new(vec![
                "/api/v1/user/login".to_string(),
                "/api/v1/user/dev-login".to_string(),
                "/api/v1/products".to_string(),
                "/api/v1/categories".to_string(),
                "/api/v1/stores".to_string(),
                "/api/v1/payments/callback".to_string(),
            ]),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
            rb: self.rb.clone(),
            public_prefixes: self.public_prefixes.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt: Arc<JwtConfig>,
    rb: Arc<RBatis>,
    public_prefixes: Arc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let jwt_cfg = self.jwt.clone();
        let rb = self.rb.clone();
        let public_prefixes = self.public_prefixes.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            if public_prefixes.iter().any(|p| path.starts_with(p)) {
                return service.call(req).await;
            }

            let token = extract_bearer_token(&req)
                .ok_or_else(|| Error::from(AppError::unauthorized("缺少登录凭证")))?;
            let claims = jwt::verify(&jwt_cfg, &token).map_err(Error::from)?;

            let user = User::select_by_id(rb.as_ref(), claims.user_id)
                .await
                .map_err(|e| Error::from(AppError::from(e)))?
                .ok_or_else(|| Error::from(AppError::unauthorized("用户不存在")))?;

            // 白名单优先于黑名单与禁用状态
            if !user.whitelist.unwrap_or(false) {
                if user.blacklist.unwrap_or(false) {
                    return Err(AppError::forbidden("账号已被拉黑").into());
                }
                if user.status.unwrap_or(User::STATUS_ACTIVE) != User::STATUS_ACTIVE {
                    return Err(AppError::unauthorized("账号已禁用").into());
                }
            }

            req.extensions_mut().insert(Identity {
                user_id: claims.user_id,
                open_id: user.open_id.clone().unwrap_or(claims.open_id),
                role: user.role.clone().unwrap_or(claims.role),
            });

            service.call(req).await
        })
    }
}

fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
