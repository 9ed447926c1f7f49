mod chain;
mod health;
mod mining;
pub mod models;
mod stats;

use actix_web::web::{self, ServiceConfig};
use actix_web::{App, HttpServer};
use log::info;

use crate::config::{ApiLimits, ServeArgs};
pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(mining::mine)
            .service(chain::validate_chain)
            .service(stats::get_stats),
    );
}

/// Bind the HTTP API and serve until shutdown.
pub async fn serve(args: ServeArgs) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(ApiLimits::from(&args)));

    println!(
        "⛓️ Starting miner API at http://{}:{}",
        args.host, args.port
    );
    info!(
        "API limits: max difficulty {}, max miners {}, max transactions {}",
        args.max_difficulty, args.max_miners, args.max_transactions
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(init_routes)
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}
