//! 金额处理
//!
//! 对外展示统一保留两位小数；内部汇总使用整数分，落库边界按银行家舍入。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 银行家舍入到两位小数（落库边界统一调用）
pub fn round2(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// 元转分（先按银行家舍入到两位小数）
pub fn to_cents(v: Decimal) -> i64 {
    (round2(v) * Decimal::from(100)).to_i64().unwrap_or(0)
}

/// 分转元
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn bankers_rounding_at_midpoint() {
        // 0.125 -> 0.12（向偶数），0.135 -> 0.14
        assert_eq!(round2(Decimal::from_str("0.125").unwrap()).to_string(), "0.12");
        assert_eq!(round2(Decimal::from_str("0.135").unwrap()).to_string(), "0.14");
        assert_eq!(round2(Decimal::from_str("70.005").unwrap()).to_string(), "70.00");
    }

    #[test]
    fn cents_round_trip() {
        let v = Decimal::from_str("70.00").unwrap();
        assert_eq!(to_cents(v), 7000);
        assert_eq!(from_cents(7000), v);
        assert_eq!(from_cents(1).to_string(), "0.01");
    }
}
