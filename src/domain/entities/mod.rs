pub mod action_logs;
pub mod credit_ledgers;
pub mod invite_tokens;
