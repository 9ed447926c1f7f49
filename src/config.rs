use clap::{Args, Parser, Subcommand};

use crate::error::ConfigError;
use crate::mining::{LinkPolicy, RunConfig, StartPolicy};

/// Concurrent Proof-of-Work chain miner.
#[derive(Parser, Debug)]
#[command(name = "chain-miner", version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub mine: MineArgs,
}

impl Cli {
    /// The chosen subcommand; mining from a file when none is given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Mine(self.mine))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mine a transaction file and report per-miner results.
    Mine(MineArgs),
    /// Serve the mining HTTP API.
    Serve(ServeArgs),
}

/// Options for a console mining run. Unset values are prompted for.
#[derive(Args, Debug, Clone)]
pub struct MineArgs {
    /// Difficulty level (1-10)
    #[arg(short, long, env = "DIFFICULTY")]
    pub difficulty: Option<u32>,

    /// Number of miner threads
    #[arg(short, long, env = "MINERS")]
    pub miners: Option<usize>,

    /// File holding the transaction count followed by the ids
    #[arg(short, long, env = "TX_FILE")]
    pub file: Option<String>,

    /// Base seed for the miners' random generators
    #[arg(long, env = "MINER_SEED")]
    pub seed: Option<u64>,

    /// How miners wait at the start gate (spin|block)
    #[arg(long, env = "START_POLICY", default_value = "spin")]
    pub start_policy: StartPolicy,

    /// Behaviour on a tail that moved before commit (reference|strict)
    #[arg(long, env = "LINK_POLICY", default_value = "reference")]
    pub link_policy: LinkPolicy,
}

impl MineArgs {
    /// Build the run configuration once difficulty and miner count are known.
    pub fn run_config(&self, difficulty: u32, miners: usize) -> Result<RunConfig, ConfigError> {
        let config = RunConfig::new(difficulty, miners)?
            .with_start_policy(self.start_policy)
            .with_link_policy(self.link_policy);
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

/// HTTP server options.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Highest difficulty accepted over HTTP
    #[arg(long, env = "MAX_API_DIFFICULTY", default_value_t = 6)]
    pub max_difficulty: u32,

    /// Most miners a single HTTP request may ask for
    #[arg(long, env = "MAX_API_MINERS", default_value_t = 64)]
    pub max_miners: usize,

    /// Most transaction ids a single HTTP request may submit
    #[arg(long, env = "MAX_API_TRANSACTIONS", default_value_t = 10_000)]
    pub max_transactions: usize,
}

/// Limits applied to API requests.
#[derive(Debug, Clone, Copy)]
pub struct ApiLimits {
    pub max_difficulty: u32,
    pub max_miners: usize,
    pub max_transactions: usize,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            max_difficulty: 6,
            max_miners: 64,
            max_transactions: 10_000,
        }
    }
}

impl From<&ServeArgs> for ApiLimits {
    fn from(args: &ServeArgs) -> Self {
        Self {
            max_difficulty: args.max_difficulty,
            max_miners: args.max_miners,
            max_transactions: args.max_transactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_mine() {
        let cli = Cli::try_parse_from(["chain-miner", "-d", "3", "-m", "2", "-f", "txs.txt"]).unwrap();
        match cli.into_command() {
            Command::Mine(args) => {
                assert_eq!(args.difficulty, Some(3));
                assert_eq!(args.miners, Some(2));
                assert_eq!(args.file.as_deref(), Some("txs.txt"));
                assert_eq!(args.start_policy, StartPolicy::Spin);
                assert_eq!(args.link_policy, LinkPolicy::Reference);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_policies() {
        let cli = Cli::try_parse_from([
            "chain-miner",
            "mine",
            "--start-policy",
            "block",
            "--link-policy",
            "strict",
            "--seed",
            "5",
        ])
        .unwrap();
        let Command::Mine(args) = cli.into_command() else {
            panic!("expected mine");
        };
        let config = args.run_config(2, 4).unwrap();
        assert_eq!(config.start_policy, StartPolicy::Block);
        assert_eq!(config.link_policy, LinkPolicy::Strict);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["chain-miner", "--link-policy", "lazy"]).is_err());
    }

    #[test]
    fn serve_limits() {
        let cli = Cli::try_parse_from([
            "chain-miner",
            "serve",
            "--port",
            "9000",
            "--max-miners",
            "8",
            "--max-transactions",
            "500",
        ])
        .unwrap();
        let Command::Serve(args) = cli.into_command() else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 9000);
        let limits = ApiLimits::from(&args);
        assert_eq!(limits.max_miners, 8);
        assert_eq!(limits.max_difficulty, 6);
        assert_eq!(limits.max_transactions, 500);
    }
}
