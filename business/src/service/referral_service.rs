use common::{AppError, AppResult};
use orm::entities::referral::ReferralClosure;
use orm::entities::user::User;
use rbatis::executor::Executor;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use std::sync::Arc;

/// 推荐关系服务
///
/// 闭包表只维护 depth=0 自身行与 depth=1 直接上级；
/// 更深层级在结算时逐级上溯。
pub struct ReferralService {
    rb: Arc<RBatis>,
}

impl ReferralService {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }

    /// 绑定/重绑上级（最后点击生效）
    ///
    /// 拒绝自荐与成环：若候选上级的祖先链中出现本人则拒绝。
    pub async fn bind(&self, user_id: i64, referrer_id: i64) -> AppResult<()> {
        if referrer_id == user_id {
            return Err(AppError::conflict("不能绑定自己为推荐人"));
        }
        User::select_by_id(self.rb.as_ref(), referrer_id)
            .await?
            .ok_or_else(|| AppError::not_found("推荐人不存在"))?;

        // 沿候选上级的 depth=1 链上溯，撞到本人即成环
        let mut current = referrer_id;
        let mut hops = 0;
        while let Some(link) =
            ReferralClosure::select_direct_referrer(self.rb.as_ref(), current).await?
        {
            if link.ancestor_user_id == user_id {
                return Err(AppError::conflict("绑定会形成推荐环"));
            }
            if link.ancestor_user_id == current {
                break;
            }
            current = link.ancestor_user_id;
            hops += 1;
            if hops > 64 {
                break;
            }
        }

        let mut tx = self
            .rb
            .acquire_begin()
            .await?
            .defer_async(|mut tx| async move {
                if !tx.done() {
                    let _ = tx.rollback().await;
                }
            });

        self.ensure_self_row(&mut tx, user_id).await?;
        self.ensure_self_row(&mut tx, referrer_id).await?;

        tx.exec(
            "delete from referral_closure where descendant_user_id = ? and depth = 1",
            vec![rbs::value!(user_id)],
        )
        .await?;
        let link = ReferralClosure {
            id: None,
            ancestor_user_id: referrer_id,
            descendant_user_id: user_id,
            depth: 1,
            create_time: Some(DateTime::now()),
        };
        ReferralClosure::insert(&tx, &link).await?;
        tx.commit().await?;
        Ok(())
    }

    /// 当前生效的直接上级
    pub async fn direct_referrer(&self, user_id: i64) -> AppResult<Option<i64>> {
        Ok(
            ReferralClosure::select_direct_referrer(self.rb.as_ref(), user_id)
                .await?
                .map(|link| link.ancestor_user_id),
        )
    }

    /// 直属下级列表
    pub async fn direct_team(&self, user_id: i64) -> AppResult<Vec<User>> {
        Ok(self
            .rb
            .query_decode(
                "select u.* from users u \
                 join referral_closure rc on rc.descendant_user_id = u.id \
                 where rc.ancestor_user_id = ? and rc.depth = 1 \
                 order by rc.create_time desc",
                vec![rbs::value!(user_id)],
            )
            .await?)
    }

    async fn ensure_self_row(
        &self,
        tx: &mut rbatis::executor::RBatisTxExecutorGuard,
        user_id: i64,
    ) -> AppResult<()> {
        if ReferralClosure::select_one(&*tx, user_id, user_id)
            .await?
            .is_none()
        {
            let row = ReferralClosure {
                id: None,
                ancestor_user_id: user_id,
                descendant_user_id: user_id,
                depth: 0,
                create_time: Some(DateTime::now()),
            };
            ReferralClosure::insert(&*tx, &row).await?;
        }
        Ok(())
    }
}
