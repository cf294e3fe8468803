// 请求/响应模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    20
}

/// 通用分页参数
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

impl PageQuery {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.size.min(100)
    }

    pub fn limit(&self) -> u64 {
        self.size.clamp(1, 100)
    }
}

// ---------- 用户 ----------

/// 登录请求（code 为小程序端换取的 open_id，支付方集成在边界处模拟）
#[derive(Debug, Deserialize)]
pub struct LoginReq {
    pub code: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DevLoginReq {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResp {
    pub token: String,
    pub user_id: i64,
    pub role: String,
}

// ---------- 购物车 ----------

#[derive(Debug, Deserialize)]
pub struct AddCartItemReq {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemReq {
    pub quantity: Option<i32>,
    pub selected: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemView {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub selected: i32,
}

// ---------- 订单 ----------

#[derive(Debug, Deserialize)]
pub struct CreateOrderReq {
    /// 1=配送 2=自提/堂食
    pub order_type: i32,
    /// 0 或缺省为商城单
    #[serde(default)]
    pub store_id: i64,
    pub user_coupon_id: Option<i64>,
    /// 分享人（下单时冻结到订单）
    #[serde(default)]
    pub sharer_uid: i64,
    #[serde(default)]
    pub share_store_id: i64,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderReq {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundConfirmReq {
    pub refund_no: String,
    /// 外部退款结果
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    pub status: Option<i32>,
}

/// 管理端订单筛选（时间为 yyyy-mm-dd HH:MM:SS 或 yyyy-mm-dd）
#[derive(Debug, Deserialize)]
pub struct AdminOrderQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    pub status: Option<i32>,
    pub store_id: Option<i64>,
    pub begin: Option<String>,
    pub end: Option<String>,
}

/// 门店经营统计
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreStats {
    pub completed_orders: u64,
    pub turnover: Decimal,
}

// ---------- 支付 ----------

#[derive(Debug, Deserialize)]
pub struct UnifiedOrderReq {
    pub order_id: i64,
    pub method: Option<String>,
}

// ---------- 优惠券 ----------

#[derive(Debug, Deserialize)]
pub struct CreateCouponReq {
    pub name: String,
    /// 1=满减 2=立减 3=折扣
    pub coupon_type: i32,
    pub amount: Decimal,
    #[serde(default)]
    pub min_amount: Decimal,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub store_id: i64,
    pub total_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GrantCouponReq {
    pub user_id: i64,
    pub coupon_id: i64,
}

// ---------- 推荐 ----------

#[derive(Debug, Deserialize)]
pub struct BindReferralReq {
    pub referrer_id: i64,
}

// ---------- RBAC ----------

#[derive(Debug, Deserialize)]
pub struct CreateRoleReq {
    pub name: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionReq {
    /// 形如 module:action
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RolePermissionReq {
    pub role_id: i64,
    pub permission_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BulkAssignReq {
    pub role_id: i64,
    pub permission_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserRoleReq {
    pub user_id: i64,
    pub role_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateCacheReq {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub all: bool,
}

// ---------- 财务管理 ----------

#[derive(Debug, Deserialize)]
pub struct AccrualRunReq {
    /// yyyy-mm-dd，缺省为当天
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseOrderReq {
    pub order_id: i64,
}

// ---------- 提现 ----------

#[derive(Debug, Deserialize)]
pub struct WithdrawApplyReq {
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRejectReq {
    pub remark: Option<String>,
}

// ---------- 门店 ----------

#[derive(Debug, Deserialize)]
pub struct UpsertStoreProductReq {
    pub product_id: i64,
    pub stock: i64,
    pub price_override: Option<Decimal>,
    /// 1=常规 2=季节限定 3=门店专供
    #[serde(default = "default_biz_type")]
    pub biz_type: i32,
}

fn default_biz_type() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_clamps_and_offsets() {
        let q = PageQuery { page: 3, size: 20 };
        assert_eq!(q.offset(), 40);
        assert_eq!(q.limit(), 20);

        let q = PageQuery { page: 0, size: 500 };
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), 100);
    }
}
