pub mod ai;
pub mod axum_http;
pub mod memory;
pub mod payments;
pub mod postgres;
