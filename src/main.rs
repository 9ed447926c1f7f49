mod api;
mod blockchain;
mod cli;
mod config;
mod error;
mod input;
mod mining;
mod report;

use clap::Parser;
use dotenvy::dotenv;

use config::{Cli, Command};
use error::AppError;

fn main() {
    let _ = dotenv();
    env_logger::init();

    if let Err(e) = run(Cli::parse().into_command()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Mine(args) => cli::run_console(args),
        Command::Serve(args) => {
            actix_web::rt::System::new().block_on(api::serve(args))?;
            Ok(())
        }
    }
}
