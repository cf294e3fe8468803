//! 支付回调签名
//!
//! 规范化编码是签名的唯一事实来源，必须逐字节稳定：
//! - 移除 `sign` 与 `testMode` 字段
//! - 键按字典序排列（递归）
//! - 紧凑输出，无空白；数字按 JSON 自然形式（不补零）；布尔小写；
//!   字符串按 JSON 标准转义
//! - HMAC-SHA256(api_key, canonical)，十六进制小写

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 参与签名前需要剔除的字段
const EXCLUDED_FIELDS: [&str; 2] = ["sign", "testMode"];

/// 规范化编码 JSON 对象
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, true, &mut out);
    out
}

fn write_canonical(value: &Value, top_level: bool, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map
                .keys()
                .filter(|k| !(top_level && EXCLUDED_FIELDS.contains(&k.as_str())))
                .collect();
            keys.sort();
            out.push('{');
            for (i, k) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(k).expect("string key"));
                out.push(':');
                write_canonical(&map[*k], false, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, false, out);
            }
            out.push(']');
        }
        // 标量：serde_json 的紧凑形式即自然 JSON 形式
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// 计算签名：HMAC-SHA256(api_key, canonical) 十六进制小写
pub fn sign(api_key: &str, body: &Value) -> String {
    let canonical = canonicalize(body);
    let mut mac = HmacSha256::new_from_slice(api_key.as_bytes()).expect("hmac accepts any key size");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// 校验回调签名
pub fn verify(api_key: &str, body: &Value, given: &str) -> bool {
    !given.is_empty() && sign(api_key, body) == given.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_drops_sign_and_test_mode_and_sorts_keys() {
        let body = json!({
            "tradeState": "SUCCESS",
            "paymentNo": "P20250101000000000000001",
            "sign": "deadbeef",
            "testMode": true,
            "paidAt": 1735700000,
        });
        assert_eq!(
            canonicalize(&body),
            r#"{"paidAt":1735700000,"paymentNo":"P20250101000000000000001","tradeState":"SUCCESS"}"#
        );
    }

    #[test]
    fn canonical_scalars_keep_natural_json_form() {
        let body = json!({"b": true, "n": 1.5, "i": 10, "s": "x\"y", "z": null});
        assert_eq!(
            canonicalize(&body),
            r#"{"b":true,"i":10,"n":1.5,"s":"x\"y","z":null}"#
        );
    }

    #[test]
    fn sign_is_stable_and_verifies() {
        let body = json!({"paymentNo": "P1", "tradeState": "SUCCESS"});
        let s = sign("secret", &body);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(verify("secret", &body, &s));
        // 大写签名同样接受
        assert!(verify("secret", &body, &s.to_uppercase()));
        assert!(!verify("secret", &body, "bad"));
        assert!(!verify("other", &body, &s));
    }

    #[test]
    fn sign_field_does_not_affect_signature() {
        let without = json!({"paymentNo": "P1", "tradeState": "SUCCESS"});
        let with = json!({"paymentNo": "P1", "tradeState": "SUCCESS", "sign": "x", "testMode": false});
        assert_eq!(sign("k", &without), sign("k", &with));
    }

    #[test]
    fn snake_case_test_mode_is_not_excluded() {
        let camel = json!({"paymentNo": "P1", "testMode": true});
        let snake = json!({"paymentNo": "P1", "test_mode": true});
        assert_eq!(canonicalize(&camel), r#"{"paymentNo":"P1"}"#);
        assert_ne!(sign("k", &camel), sign("k", &snake));
    }
}
