pub mod commission;
pub mod partner_level;
pub mod referral_closure;
pub mod withdraw_record;

pub use commission::Commission;
pub use partner_level::PartnerLevel;
pub use referral_closure::ReferralClosure;
pub use withdraw_record::WithdrawRecord;
