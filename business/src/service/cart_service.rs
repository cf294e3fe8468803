use common::{AppError, AppResult};
use orm::entities::catalog::{Product, StoreProduct};
use orm::entities::trade::{Cart, CartItem};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use std::sync::Arc;

use crate::middleware::auth::Identity;
use crate::models::CartItemView;

use super::store_scope;

/// 购物车服务（每用户一条购物车，明细合并累加）
pub struct CartService {
    rb: Arc<RBatis>,
}

impl CartService {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }

    async fn get_or_create(&self, user_id: i64) -> AppResult<Cart> {
        if let Some(cart) = Cart::select_by_user_id(self.rb.as_ref(), user_id).await? {
            return Ok(cart);
        }
        let now = DateTime::now();
        let cart = Cart {
            id: None,
            user_id,
            create_time: Some(now.clone()),
            update_time: Some(now),
        };
        let res = Cart::insert(self.rb.as_ref(), &cart).await?;
        Ok(Cart {
            id: res.last_insert_id.as_i64(),
            ..cart
        })
    }

    /// 加入购物车
    ///
    /// 门店账号的购物车限定在本店绑定的商品内，越界在加购时即拒绝。
    pub async fn add_item(
        &self,
        identity: &Identity,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<CartItem> {
        if quantity <= 0 {
            return Err(AppError::invalid_param("数量必须大于 0"));
        }
        let product = Product::select_by_id(self.rb.as_ref(), product_id)
            .await?
            .ok_or_else(|| AppError::not_found("商品不存在"))?;
        if product.status != Product::STATUS_ON_SALE {
            return Err(AppError::conflict("商品已下架"));
        }

        if let Some(store_id) = store_scope::store_of(self.rb.as_ref(), identity).await? {
            let bound =
                StoreProduct::select_one(self.rb.as_ref(), store_id, product_id).await?;
            if bound.is_none() {
                return Err(AppError::forbidden("商品不在本门店经营范围内"));
            }
        }

        let cart = self.get_or_create(identity.user_id).await?;
        let cart_id = cart.id.ok_or_else(|| AppError::internal("购物车缺少主键"))?;

        if let Some(mut item) =
            CartItem::select_one(self.rb.as_ref(), cart_id, product_id).await?
        {
            item.quantity += quantity;
            let item_id = item.id.unwrap_or_default();
            self.rb
                .exec(
                    "update cart_items set quantity = ? where id = ?",
                    vec![rbs::value!(item.quantity), rbs::value!(item_id)],
                )
                .await?;
            return Ok(item);
        }

        let item = CartItem {
            id: None,
            cart_id,
            product_id,
            quantity,
            selected: CartItem::SELECTED,
        };
        let res = CartItem::insert(self.rb.as_ref(), &item).await?;
        Ok(CartItem {
            id: res.last_insert_id.as_i64(),
            ..item
        })
    }

    pub async fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        quantity: Option<i32>,
        selected: Option<i32>,
    ) -> AppResult<()> {
        let cart = self
            .require_cart(user_id)
            .await?;
        let cart_id = cart.id.unwrap_or_default();

        if let Some(q) = quantity {
            if q <= 0 {
                return Err(AppError::invalid_param("数量必须大于 0"));
            }
            let res = self
                .rb
                .exec(
                    "update cart_items set quantity = ? where id = ? and cart_id = ?",
                    vec![rbs::value!(q), rbs::value!(item_id), rbs::value!(cart_id)],
                )
                .await?;
            if res.rows_affected == 0 {
                return Err(AppError::not_found("购物车明细不存在"));
            }
        }
        if let Some(s) = selected {
            let res = self
                .rb
                .exec(
                    "update cart_items set selected = ? where id = ? and cart_id = ?",
                    vec![
                        rbs::value!(if s != 0 { 1 } else { 0 }),
                        rbs::value!(item_id),
                        rbs::value!(cart_id),
                    ],
                )
                .await?;
            if res.rows_affected == 0 {
                return Err(AppError::not_found("购物车明细不存在"));
            }
        }
        Ok(())
    }

    pub async fn remove_item(&self, user_id: i64, item_id: i64) -> AppResult<()> {
        let cart = self.require_cart(user_id).await?;
        let res = self
            .rb
            .exec(
                "delete from cart_items where id = ? and cart_id = ?",
                vec![rbs::value!(item_id), rbs::value!(cart.id.unwrap_or_default())],
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::not_found("购物车明细不存在"));
        }
        Ok(())
    }

    pub async fn clear(&self, user_id: i64) -> AppResult<()> {
        if let Some(cart) = Cart::select_by_user_id(self.rb.as_ref(), user_id).await? {
            self.rb
                .exec(
                    "delete from cart_items where cart_id = ?",
                    vec![rbs::value!(cart.id.unwrap_or_default())],
                )
                .await?;
        }
        Ok(())
    }

    /// 购物车明细视图（带商品名称与现价）
    pub async fn list(&self, user_id: i64) -> AppResult<Vec<CartItemView>> {
        let Some(cart) = Cart::select_by_user_id(self.rb.as_ref(), user_id).await? else {
            return Ok(Vec::new());
        };
        let views: Vec<CartItemView> = self
            .rb
            .query_decode(
                "select ci.id, ci.product_id, p.name as product_name, \
                 p.price as unit_price, ci.quantity, ci.selected \
                 from cart_items ci join products p on p.id = ci.product_id \
                 where ci.cart_id = ? order by ci.id",
                vec![rbs::value!(cart.id.unwrap_or_default())],
            )
            .await?;
        Ok(views)
    }

    async fn require_cart(&self, user_id: i64) -> AppResult<Cart> {
        Cart::select_by_user_id(self.rb.as_ref(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("购物车不存在"))
    }
}
