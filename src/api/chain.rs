use actix_web::{HttpResponse, Responder, post, web};
use log::debug;

use super::models::{ValidateRequest, ValidateResponse};
use crate::blockchain::{stale_links, validate_detailed};
use crate::mining::DifficultyParams;

/// Validate a chain supplied by the caller against a difficulty.
#[post("/validate/")]
pub async fn validate_chain(body: web::Json<ValidateRequest>) -> impl Responder {
    let params = match DifficultyParams::new(body.difficulty) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    let violation = validate_detailed(&body.chain, params.threshold).err();
    debug!(
        "VALIDATE - {} record(s) at difficulty {}: {:?}",
        body.chain.len(),
        params.difficulty,
        violation
    );

    HttpResponse::Ok().json(ValidateResponse {
        valid: violation.is_none(),
        length: body.chain.len(),
        threshold: params.threshold,
        violation,
        stale_links: stale_links(&body.chain),
    })
}
