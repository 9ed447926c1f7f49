use thiserror::Error;

/// Problems with the transaction-id input file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("filename cannot be empty")]
    EmptyFilename,

    #[error("error opening file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading number of transactions from file or invalid value")]
    InvalidCount,

    #[error("error reading transaction id #{position} from file")]
    InvalidId { position: usize },

    #[error("file contains more transaction ids than specified ({expected})")]
    TooManyIds { expected: usize },

    #[error("input ended before a valid {0} was entered")]
    Eof(&'static str),

    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),

    #[error("failed to write to console: {0}")]
    Output(#[source] std::io::Error),
}

/// Invalid run parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("difficulty {0} outside 1-10")]
    InvalidDifficulty(u32),

    #[error("number of miners must be positive")]
    NoMiners,

    #[error("unknown {kind} policy '{value}'")]
    UnknownPolicy { kind: &'static str, value: String },
}

/// Failures of the thread plumbing around a mining run.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("failed to spawn miner {miner}: {source}")]
    Spawn {
        miner: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("miner {0} panicked")]
    MinerPanicked(usize),
}

/// Top-level error returned by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mining(#[from] MiningError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
