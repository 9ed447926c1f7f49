use std::io::{self, BufRead, Write};

use log::info;

use crate::config::MineArgs;
use crate::error::{AppError, InputError};
use crate::input::{prompt_difficulty, prompt_filename, prompt_miners, read_transaction_file};
use crate::mining::{DifficultyParams, run_mining};
use crate::report::write_report;

/// Console mining run on stdin/stdout.
pub fn run_console(args: MineArgs) -> Result<(), AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(args, &mut stdin.lock(), &mut stdout.lock())
}

/// Gather the missing parameters, mine the file and print the results.
pub fn run_with_io<R: BufRead, W: Write>(
    args: MineArgs,
    input: &mut R,
    output: &mut W,
) -> Result<(), AppError> {
    let difficulty = match args.difficulty {
        Some(d) => d,
        None => prompt_difficulty(input, output)?.ok_or(InputError::Eof("difficulty level"))?,
    };
    let params = DifficultyParams::new(difficulty)?;
    writeln!(output, "Threshold: {}", params.threshold).map_err(InputError::Output)?;

    let filename = match args.file.clone() {
        Some(f) => f,
        None => prompt_filename(input, output)?,
    };
    let miners = match args.miners {
        Some(m) => m,
        None => prompt_miners(input, output)?.ok_or(InputError::Eof("number of miners"))?,
    };
    let config = args.run_config(difficulty, miners)?;

    writeln!(output, "----------START----------").map_err(InputError::Output)?;
    let ids = read_transaction_file(&filename)?;
    info!("Read {} transaction(s) from {}", ids.len(), filename);

    let report = run_mining(&config, ids)?;
    write_report(&report, output).map_err(InputError::Output)?;
    Ok(())
}
