//! 业务单号生成：前缀 + 时间戳 + 雪花序列后缀
//!
//! O=订单 P=支付 R=退款 W=提现

use chrono::Local;

use super::snowflake;

fn generate(prefix: &str) -> String {
    let ts = Local::now().format("%Y%m%d%H%M%S");
    let suffix = snowflake::generate_id() % 1_000_000_000;
    format!("{}{}{:09}", prefix, ts, suffix)
}

pub fn order_no() -> String {
    generate("O")
}

pub fn payment_no() -> String {
    generate("P")
}

pub fn refund_no() -> String {
    generate("R")
}

pub fn withdraw_no() -> String {
    generate("W")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_carry_prefix_and_are_unique() {
        let a = payment_no();
        let b = payment_no();
        assert!(a.starts_with('P'));
        assert_ne!(a, b);
        assert_eq!(a.len(), 1 + 14 + 9);
    }
}
