use common::config::PartnerConfig;
use common::{AppError, AppResult};
use orm::entities::referral::PartnerLevel;
use orm::entities::user::User;
use rbatis::executor::Executor;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 一组分佣比例（直推 + 团队）
#[derive(Debug, Clone, Copy)]
pub struct RateSet {
    pub direct_rate: Decimal,
    pub team_rate: Decimal,
}

/// 解析全局配置里的兜底比例
pub fn config_rates(cfg: &PartnerConfig) -> AppResult<RateSet> {
    let direct_rate = Decimal::from_str(&cfg.direct_rate)
        .map_err(|_| AppError::internal(format!("无效的直推比例配置: {}", cfg.direct_rate)))?;
    let team_rate = Decimal::from_str(&cfg.team_rate)
        .map_err(|_| AppError::internal(format!("无效的团队比例配置: {}", cfg.team_rate)))?;
    Ok(RateSet {
        direct_rate,
        team_rate,
    })
}

/// 取收益人当前合伙人等级的比例快照，无等级记录时回退全局配置
pub async fn resolve(
    executor: &dyn Executor,
    cfg: &PartnerConfig,
    user_id: i64,
) -> AppResult<RateSet> {
    let fallback = config_rates(cfg)?;
    let user = match User::select_by_id(executor, user_id).await? {
        Some(u) => u,
        None => return Ok(fallback),
    };
    let level_id = match user.partner_level_id {
        Some(id) => id,
        None => return Ok(fallback),
    };
    match PartnerLevel::select_by_id(executor, level_id).await? {
        Some(level) => Ok(RateSet {
            direct_rate: level.direct_rate,
            team_rate: level.team_rate,
        }),
        None => Ok(fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rates_parse_defaults() {
        let rates = config_rates(&PartnerConfig::default()).unwrap();
        assert_eq!(rates.direct_rate.to_string(), "0.10");
        assert_eq!(rates.team_rate.to_string(), "0.02");
    }

    #[test]
    fn config_rates_reject_garbage() {
        let cfg = PartnerConfig {
            direct_rate: "abc".to_string(),
            ..PartnerConfig::default()
        };
        assert!(config_rates(&cfg).is_err());
    }
}
