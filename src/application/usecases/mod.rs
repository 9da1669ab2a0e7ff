pub mod action_logs;
pub mod chat;
pub mod entitlements;
pub mod payments;
pub mod referrals;
