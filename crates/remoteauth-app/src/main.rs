use std::path::PathBuf;

use clap::Parser;
use remoteauth::config::{self, AppConfig};
use remoteauth_core::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
struct Args {
	/// Use inline configuration (YAML or JSON)
	#[arg(short, long, value_name = "config", conflicts_with = "file")]
	config: Option<String>,

	/// Use a configuration file
	#[arg(short, long, value_name = "file")]
	file: Option<PathBuf>,

	/// Parse and validate the configuration, then exit
	#[arg(long, default_value_t = false)]
	validate_only: bool,
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.build()?
		.block_on(async move {
			let config = load(&args).await?;
			if args.validate_only {
				println!("Configuration is valid!");
				return Ok(());
			}
			telemetry::setup_logging(&config.logging)?;
			info!(version = env!("CARGO_PKG_VERSION"), "starting remoteauth");
			remoteauth::app::run(config).await
		})
}

async fn load(args: &Args) -> anyhow::Result<AppConfig> {
	match (&args.config, &args.file) {
		(Some(contents), _) => config::parse_config(contents),
		(None, Some(path)) => config::load_config(path).await,
		(None, None) => anyhow::bail!("either --config or --file is required"),
	}
}
