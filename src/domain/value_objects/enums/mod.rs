pub mod action_kinds;
pub mod payment_methods;
pub mod plan_ids;
