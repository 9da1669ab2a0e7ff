pub mod actions;
pub mod chat;
pub mod entitlements;
pub mod enums;
pub mod payments;
pub mod plans;
pub mod referrals;
