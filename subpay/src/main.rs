//! SubPay demo CLI.
//!
//! Writes a default config, inspects the built-in seed, validates seed files,
//! prices a pay intent, and runs the onboarding journey in memory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use subpay::core::checkout::CheckoutQuery;
use subpay::core::types::TimelineEntry;
use subpay::exit_codes;
use subpay::flows::{CreatePlanRequest, FlowContext};
use subpay::io::config::{DemoConfig, load_config, write_config};
use subpay::io::seed_store::{SeedFile, initial_state, load_seed, write_seed};
use subpay::logging;
use subpay::state::{DemoState, seed_state};
use subpay::store::Store;
use subpay::walkthrough::run_walkthrough;

#[derive(Parser)]
#[command(
    name = "subpay",
    version,
    about = "SubPay subscription-savings demo store"
)]
struct Cli {
    /// Demo config file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "subpay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with every default spelled out.
    InitConfig {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the built-in seed as JSON, or write it to a file.
    Seed {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check a seed file against the schema and invariants.
    Validate { path: PathBuf },
    /// Price a pay intent from checkout query values.
    Quote {
        #[command(flatten)]
        checkout: CheckoutArgs,
        /// Add-on amount; unparsable input counts as 0.
        #[arg(long)]
        addon: Option<String>,
    },
    /// Run connect, create, top-up, allocate and pay in memory.
    Walkthrough {
        #[command(flatten)]
        checkout: CheckoutArgs,
    },
}

#[derive(clap::Args)]
struct CheckoutArgs {
    #[arg(long)]
    merchant: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    freq: Option<String>,
}

impl CheckoutArgs {
    fn into_query(self, addon: Option<String>) -> CheckoutQuery {
        CheckoutQuery {
            merchant: self.merchant,
            amount: self.amount,
            currency: self.currency,
            freq: self.freq,
            addon,
        }
    }
}

#[derive(Serialize)]
struct WalkthroughOutput<'a> {
    plan_id: &'a str,
    entries: &'a [TimelineEntry],
    state: &'a DemoState,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::InitConfig { force } => cmd_init_config(&cli.config, force),
        Command::Seed { out } => cmd_seed(out.as_deref()),
        Command::Validate { path } => cmd_validate(&path),
        Command::Quote { checkout, addon } => cmd_quote(&cli.config, checkout.into_query(addon)),
        Command::Walkthrough { checkout } => cmd_walkthrough(&cli.config, checkout.into_query(None)),
    }
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    write_config(path, &DemoConfig::default())?;
    println!("wrote {}", path.display());
    Ok(())
}

fn cmd_seed(out: Option<&Path>) -> Result<()> {
    let seed = SeedFile::from_state(&seed_state());
    match out {
        Some(path) => write_seed(path, &seed),
        None => print_json(&seed),
    }
}

fn cmd_validate(path: &Path) -> Result<()> {
    let seed = load_seed(path)?;
    println!(
        "ok: {} plans, {} strategies, {} timeline entries",
        seed.plans.len(),
        seed.strategies.len(),
        seed.timeline.len()
    );
    Ok(())
}

fn cmd_quote(config_path: &Path, query: CheckoutQuery) -> Result<()> {
    let config = load_config(config_path)?;
    let state = initial_state(&config).context("load initial state")?;
    let apr = state.strategies.first().map(|strategy| strategy.apr);
    print_json(&query.quote(apr))
}

fn cmd_walkthrough(config_path: &Path, query: CheckoutQuery) -> Result<()> {
    let config = load_config(config_path)?;
    let mut store = Store::new(initial_state(&config).context("load initial state")?);
    let ctx = FlowContext::system(config);

    let report = run_walkthrough(&mut store, &ctx, &CreatePlanRequest::from_checkout(&query))?;
    print_json(&WalkthroughOutput {
        plan_id: &report.plan_id,
        entries: &report.entries,
        state: store.state(),
    })
}

/// Print `value` as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{}", payload);
    Ok(())
}
