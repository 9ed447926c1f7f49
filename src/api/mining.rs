use actix_web::{HttpResponse, Responder, post, web};
use log::{error, info, warn};
use std::sync::PoisonError;
use uuid::Uuid;

use super::models::{AppState, MineRequest, MineResponse};
use crate::mining::{RunConfig, run_mining};

/// Run a complete mining session over the supplied transaction ids.
///
/// The miners run on actix's blocking pool; the response carries per-miner
/// counts, the chain verdict and, on request, the mined chain itself.
#[post("/mine/")]
pub async fn mine(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let req = req.into_inner();
    let limits = state.limits;

    if req.difficulty > limits.max_difficulty {
        return HttpResponse::BadRequest().body(format!(
            "difficulty too high for this server (max {})",
            limits.max_difficulty
        ));
    }
    if req.miners > limits.max_miners {
        return HttpResponse::BadRequest()
            .body(format!("too many miners (max {})", limits.max_miners));
    }
    if req.transaction_ids.is_empty() {
        return HttpResponse::BadRequest().body("transaction_ids required");
    }
    if req.transaction_ids.len() > limits.max_transactions {
        return HttpResponse::BadRequest().body(format!(
            "too many transactions (max {})",
            limits.max_transactions
        ));
    }

    let config = match RunConfig::new(req.difficulty, req.miners) {
        Ok(c) => c
            .with_link_policy(req.link_policy)
            .with_start_policy(req.start_policy),
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    let config = match req.seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    };

    let run_id = Uuid::new_v4().to_string();
    info!(
        "RUN {} - {} txs, {} miners, difficulty {}",
        &run_id,
        req.transaction_ids.len(),
        req.miners,
        req.difficulty
    );

    let ids = req.transaction_ids;
    let report = match web::block(move || run_mining(&config, ids)).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            error!("RUN {} failed: {}", run_id, e);
            return HttpResponse::InternalServerError().body(e.to_string());
        }
        Err(e) => {
            error!("RUN {} blocking task failed: {}", run_id, e);
            return HttpResponse::InternalServerError().body("mining task failed");
        }
    };

    {
        let mut stats = state.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.runs += 1;
        stats.transactions_mined += report.total_mined();
        if !report.valid {
            stats.invalid_chains += 1;
        }
        stats.last_run_at = Some(chrono::Utc::now().timestamp());
    }

    if !report.valid {
        warn!("RUN {} produced an invalid chain", run_id);
    }
    info!(
        "RUN {} sealed {} record(s) in {:?} (valid={})",
        run_id,
        report.chain.len(),
        report.elapsed,
        report.valid
    );

    HttpResponse::Ok().json(MineResponse::from_report(run_id, report, req.include_chain))
}
