use actix_web::{HttpResponse, Responder, get, web};
use std::sync::PoisonError;

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let stats = state
        .stats
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    HttpResponse::Ok().json(StatsResponse {
        stats,
        max_difficulty: state.limits.max_difficulty,
        max_miners: state.limits.max_miners,
        max_transactions: state.limits.max_transactions,
    })
}
