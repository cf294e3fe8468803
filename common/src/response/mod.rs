use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// 统一响应体，code = 0 表示成功
#[derive(Debug, Serialize, Deserialize)]
pub struct R<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> R<T> {
    /// 成功响应，返回 Result 类型以便直接在 handler 中使用
    pub fn success(data: T) -> Result<R<T>, crate::error::AppError> {
        Ok(Self {
            code: 0,
            message: "ok".to_string(),
            data: Some(data),
        })
    }

    pub fn error(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
        }
    }
}

impl R<()> {
    /// 成功响应（无数据）
    pub fn ok() -> Result<R<()>, crate::error::AppError> {
        Ok(R::<()> {
            code: 0,
            message: "ok".to_string(),
            data: None,
        })
    }
}

// 为 R<T> 实现 Responder trait
impl<T: Serialize> Responder for R<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match serde_json::to_string(&self) {
            Ok(body) => HttpResponse::Ok()
                .content_type("application/json")
                .body(body),
            Err(e) => HttpResponse::InternalServerError()
                .content_type("application/json")
                .body(format!(r#"{{"code":1005,"message":"serialize error: {}"}}"#, e)),
        }
    }
}

/// 分页响应体，顶层附加 total/page/size
#[derive(Debug, Serialize, Deserialize)]
pub struct PageR<T> {
    pub code: i32,
    pub message: String,
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

impl<T: Serialize> PageR<T> {
    pub fn success(
        data: Vec<T>,
        total: u64,
        page: u64,
        size: u64,
    ) -> Result<PageR<T>, crate::error::AppError> {
        Ok(Self {
            code: 0,
            message: "ok".to_string(),
            data,
            total,
            page,
            size,
        })
    }
}

impl<T: Serialize> Responder for PageR<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match serde_json::to_string(&self) {
            Ok(body) => HttpResponse::Ok()
                .content_type("application/json")
                .body(body),
            Err(e) => HttpResponse::InternalServerError()
                .content_type("application/json")
                .body(format!(r#"{{"code":1005,"message":"serialize error: {}"}}"#, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let r = R::success(42u32).unwrap();
        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(s, r#"{"code":0,"message":"ok","data":42}"#);
    }

    #[test]
    fn paged_envelope_has_top_level_total() {
        let p = PageR::success(vec![1, 2, 3], 30, 1, 3).unwrap();
        let v: serde_json::Value = serde_json::to_value(&p).unwrap();
        assert_eq!(v["total"], 30);
        assert_eq!(v["page"], 1);
        assert_eq!(v["size"], 3);
    }
}
