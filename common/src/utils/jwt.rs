//! JWT 签发与校验（HS256）
//!
//! user_id 兼容数字与数字字符串两种形态（历史小程序端差异）

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: i64,
    pub open_id: String,
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom("user_id 必须是数字或数字字符串")),
    }
}

/// 为用户签发 token
pub fn issue(cfg: &JwtConfig, user_id: i64, open_id: &str, role: &str) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user_id,
        open_id: open_id.to_string(),
        role: role.to_string(),
        iss: cfg.issuer.clone(),
        iat: now,
        nbf: now,
        exp: now + cfg.ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("签发 token 失败: {}", e)))
}

/// 校验 token 并返回声明
pub fn verify(cfg: &JwtConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[cfg.issuer.as_str()]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("无效的登录凭证"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "tea-api".to_string(),
            ttl_secs: 3600,
        }
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let c = cfg();
        let token = issue(&c, 42, "oabc", "user").unwrap();
        let claims = verify(&c, &token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.open_id, "oabc");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.iss, "tea-api");
    }

    #[test]
    fn user_id_coerces_from_numeric_string() {
        let json = r#"{"user_id":"7","open_id":"o","role":"user","iss":"tea-api","iat":0,"nbf":0,"exp":0}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user_id, 7);

        let json = r#"{"user_id":7,"open_id":"o","role":"user","iss":"tea-api","iat":0,"nbf":0,"exp":0}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user_id, 7);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue(&cfg(), 1, "o", "user").unwrap();
        let mut other = cfg();
        other.secret = "another".to_string();
        assert!(verify(&other, &token).is_err());
    }
}
