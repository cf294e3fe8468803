// 错误处理模块
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::response::R;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("参数错误: {0}")]
    InvalidParam(String),

    #[error("未授权: {0}")]
    Unauthorized(String),

    #[error("禁止访问: {0}")]
    Forbidden(String),

    #[error("未找到: {0}")]
    NotFound(String),

    /// 业务冲突：库存不足、状态机违例、混合购物车、重复约束等
    #[error("{0}")]
    Conflict(String),

    /// 支付回调签名校验失败（按支付方契约返回裸 400）
    #[error("签名校验失败")]
    Signature,

    #[error("请求过于频繁")]
    RateLimited,

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("Redis错误: {0}")]
    Redis(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        AppError::InvalidParam(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// 业务错误码（响应体中的 code 字段）
    pub fn biz_code(&self) -> i32 {
        match self {
            AppError::InvalidParam(_) => 1001,
            AppError::Unauthorized(_) => 1002,
            AppError::Forbidden(_) => 1003,
            AppError::NotFound(_) => 1004,
            AppError::Conflict(_) => 1,
            AppError::Signature => 400,
            AppError::RateLimited => 429,
            AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_) => 1005,
        }
    }
}

// 错误到 HTTP 投影：
//   InvalidParam/Conflict 属业务层错误，传输层仍为 200
//   Signature 为支付方契约，返回裸 400 文本
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidParam(_) | AppError::Conflict(_) => StatusCode::OK,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Signature => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, AppError::Signature) {
            return HttpResponse::BadRequest()
                .content_type("text/plain; charset=utf-8")
                .body("invalid signature");
        }
        if matches!(self, AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_)) {
            log::error!("internal error: {}", self);
        }
        let body: R<()> = R::error(self.biz_code(), self.to_string());
        HttpResponse::build(self.status_code()).json(body)
    }
}

// 从 rbatis 错误转换 (rbatis::Error 包含了 rbdc::Error)
impl From<rbatis::Error> for AppError {
    fn from(err: rbatis::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

// 从 redis 错误转换
impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Redis(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn biz_codes_follow_projection_table() {
        assert_eq!(AppError::invalid_param("x").biz_code(), 1001);
        assert_eq!(AppError::unauthorized("x").biz_code(), 1002);
        assert_eq!(AppError::forbidden("x").biz_code(), 1003);
        assert_eq!(AppError::not_found("x").biz_code(), 1004);
        assert_eq!(AppError::conflict("x").biz_code(), 1);
        assert_eq!(AppError::RateLimited.biz_code(), 429);
        assert_eq!(AppError::internal("x").biz_code(), 1005);
    }

    #[test]
    fn conflict_keeps_http_200() {
        assert_eq!(AppError::conflict("库存不足").status_code(), StatusCode::OK);
        assert_eq!(
            AppError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Signature.status_code(), StatusCode::BAD_REQUEST);
    }
}
