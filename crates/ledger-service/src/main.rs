//! Main entry point for the ledger transfer CLI.
//!
//! Connects to the configured ledger endpoint and runs one command: report
//! the connection, read a balance, quote the gas price or send a transfer
//! and wait for its receipt.

use clap::{Parser, Subcommand};
use ledger_config::Config;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::ServiceError;

/// Command-line arguments for the ledger CLI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/apothem.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Connect and print the endpoint's chain id
	Status,
	/// Print the native balance of an address
	Balance {
		/// Address in 0x or xdc form; defaults to the configured sender
		#[arg(short, long)]
		address: Option<String>,
	},
	/// Print the network gas price and the price a transfer would use
	GasPrice,
	/// Send a native transfer and wait for its receipt
	Send {
		/// Amount in the native unit
		#[arg(long)]
		amount: Decimal,
		/// Recipient; defaults to [wallet].to_address
		#[arg(long)]
		to: Option<String>,
		/// Sender; defaults to [wallet].from_address or the key's address
		#[arg(long)]
		from: Option<String>,
	},
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	match run(args).await {
		Ok(output) => {
			println!("{}", output);
			ExitCode::SUCCESS
		},
		Err(e) => {
			eprintln!("Error: {}", e);
			if let Some(hint) = e.hint() {
				eprintln!("{}", hint);
			}
			ExitCode::FAILURE
		},
	}
}

async fn run(args: Args) -> Result<String, ServiceError> {
	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		config = %args.config.display(),
		rpc_url = %config.network.rpc_url,
		"Loaded configuration"
	);

	let handle = ledger_delivery::connect(&config.network).await?;

	match args.command {
		Command::Status => Ok(commands::status(&handle, &config)),
		Command::Balance { address } => commands::balance(&handle, &config, address).await,
		Command::GasPrice => commands::gas_price(&handle, &config).await,
		Command::Send { amount, to, from } => {
			let receipt = commands::send(&handle, &config, amount, to, from).await?;
			Ok(commands::format_receipt(&receipt))
		},
	}
}
