use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use wallet_forge::utils::logging;
use wallet_forge::{
    Generator, GeneratorConfig, JsonRpcProbe, ProgressEvent, RunSummary, WalletOutcome, WordCount,
};

/// Generate EVM wallets against live BNB Smart Chain nodes and append them
/// to a JSON wallet file.
#[derive(Parser, Debug)]
#[command(name = "wallet-forge", version)]
struct Cli {
    /// Number of wallets to generate (asked interactively when omitted)
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Recovery phrase length: 12, 15, 18, 21 or 24
    #[arg(short, long, value_parser = parse_word_count)]
    words: Option<WordCount>,

    /// Wallet store file
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Candidate RPC endpoint; repeat to give several (replaces the defaults)
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Probe attempts per wallet before it is skipped
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Pause between failed probes, in milliseconds
    #[arg(long)]
    backoff_ms: Option<u64>,

    /// Pause between wallets, in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// HTTP timeout of one probe, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_word_count(value: &str) -> Result<WordCount, String> {
    let words: u8 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    WordCount::try_from(words)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::set_debug(cli.verbose);

    match run(cli) {
        Ok(summary) => exit_code(&summary),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<RunSummary> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    config.wallet_count = match (cli.count, &cli.config) {
        (Some(count), _) => count,
        (None, Some(_)) => config.wallet_count,
        (None, None) => prompt_wallet_count()?,
    };
    if let Some(words) = cli.words {
        config.word_count = words;
    }
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if !cli.endpoints.is_empty() {
        config.endpoints = cli.endpoints;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(backoff_ms) = cli.backoff_ms {
        config.backoff_ms = backoff_ms;
    }
    if let Some(pacing_ms) = cli.pacing_ms {
        config.pacing_ms = pacing_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.request_timeout_secs = timeout_secs;
    }

    let probe = JsonRpcProbe::new(config.request_timeout())?;
    let generator = Generator::new(&config, probe)?;

    let summary = generator.run(print_progress);

    println!(
        "Generated {} of {} wallets into {} (skipped {}, failed {})",
        summary.generated.len(),
        summary.requested,
        config.store_path.display(),
        summary.skipped.len(),
        summary.failed.len(),
    );

    Ok(summary)
}

fn prompt_wallet_count() -> Result<u32> {
    print!("How many wallets would you like to generate? ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read wallet count")?;
    if read == 0 {
        bail!("no wallet count given");
    }

    line.trim()
        .parse::<u32>()
        .with_context(|| format!("'{}' is not a valid wallet count", line.trim()))
}

fn print_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::Connected {
            node_url,
            block_number,
            ..
        } => {
            println!("{}", "-".repeat(50));
            println!("Connection Successful");
            println!("Connected to: {}", node_url);
            println!("Latest Block Number: {}", block_number);
            println!("{}", "-".repeat(50));
        }
        ProgressEvent::Finished { total, outcome } => match outcome {
            WalletOutcome::Done(summary) => {
                println!("Generated wallet {}/{}", summary.index, total);
                if summary.store_reinitialized {
                    println!("Warning: wallet store was unreadable and has been reinitialized");
                }
            }
            WalletOutcome::Skipped { index, reason } => {
                println!("Skipped wallet {}/{}: {}", index, total, reason);
            }
            WalletOutcome::Failed {
                index,
                stage,
                error,
            } => {
                println!("Wallet {}/{} failed while {}: {}", index, total, stage, error);
            }
        },
    }
}

/// 0 when every wallet was generated, 2 for a partial run, 1 when nothing was
fn exit_code(summary: &RunSummary) -> ExitCode {
    if summary.is_complete() {
        ExitCode::SUCCESS
    } else if summary.is_empty() {
        ExitCode::from(1)
    } else {
        ExitCode::from(2)
    }
}
