use actix_web::{get, post, web, Responder};
use common::response::R;
use common::utils::jwt;
use common::AppError;
use orm::entities::user::User;
use rbatis::rbdc::datetime::DateTime;

use crate::middleware::auth::Identity;
use crate::models::{DevLoginReq, LoginReq, LoginResp};
use crate::state::AppState;

/// 小程序登录：code 在边界处直接充当 open_id（换取逻辑在网关外模拟）
#[post("/api/v1/user/login")]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginReq>,
) -> Result<impl Responder, AppError> {
    let req = req.into_inner();
    if req.code.trim().is_empty() {
        return Err(AppError::invalid_param("code 不能为空"));
    }
    let open_id = req.code.trim();

    let user = match User::select_by_open_id(state.rb.as_ref(), open_id).await? {
        Some(user) => user,
        None => {
            let now = DateTime::now();
            let user = User {
                id: None,
                open_id: Some(open_id.to_string()),
                phone: req.phone,
                nickname: req.nickname,
                role: Some(User::ROLE_USER.to_string()),
                status: Some(User::STATUS_ACTIVE),
                blacklist: Some(false),
                whitelist: Some(false),
                balance: None,
                interest_rate: None,
                partner_level_id: None,
                create_time: Some(now.clone()),
                update_time: Some(now),
            };
            let res = User::insert(state.rb.as_ref(), &user).await?;
            User {
                id: res.last_insert_id.as_i64(),
                ..user
            }
        }
    };

    let user_id = user.id.ok_or_else(|| AppError::internal("用户主键缺失"))?;
    let role = user.role.unwrap_or_else(|| User::ROLE_USER.to_string());
    let token = jwt::issue(&state.config.jwt, user_id, open_id, &role)?;
    R::success(LoginResp {
        token,
        user_id,
        role,
    })
}

/// 本地调试登录，非 local 环境一律拒绝
#[post("/api/v1/user/dev-login")]
pub async fn dev_login(
    state: web::Data<AppState>,
    req: web::Json<DevLoginReq>,
) -> Result<impl Responder, AppError> {
    if !state.config.is_local_env() {
        return Err(AppError::forbidden("仅本地环境可用"));
    }
    let user = User::select_by_id(state.rb.as_ref(), req.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("用户不存在"))?;
    let role = user.role.unwrap_or_else(|| User::ROLE_USER.to_string());
    let open_id = user.open_id.unwrap_or_default();
    let token = jwt::issue(&state.config.jwt, req.user_id, &open_id, &role)?;
    R::success(LoginResp {
        token,
        user_id: req.user_id,
        role,
    })
}

#[get("/api/v1/user/info")]
pub async fn info(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let user = User::select_by_id(state.rb.as_ref(), identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("用户不存在"))?;
    R::success(user)
}

/// 续签 token
#[post("/api/v1/user/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<impl Responder, AppError> {
    let token = jwt::issue(
        &state.config.jwt,
        identity.user_id,
        &identity.open_id,
        &identity.role,
    )?;
    R::success(LoginResp {
        token,
        user_id: identity.user_id,
        role: identity.role.clone(),
    })
}
