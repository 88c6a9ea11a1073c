pub mod backfill;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use thoughtline_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = thoughtline_cli::VERSION,
	rename_all = "kebab",
	styles = thoughtline_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = thoughtline_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.providers.embedding.dimensions).await?;

	backfill::run_backfill(&db, &config.providers.embedding).await
}
