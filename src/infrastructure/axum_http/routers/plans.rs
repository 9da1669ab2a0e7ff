use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::domain::value_objects::plans::{PlanCatalog, PlanTierDto};

pub fn routes() -> Router {
    Router::new().route("/", get(list_plans))
}

pub async fn list_plans() -> impl IntoResponse {
    let plans: Vec<PlanTierDto> = PlanCatalog::all().iter().map(PlanTierDto::from).collect();
    (StatusCode::OK, Json(plans))
}
