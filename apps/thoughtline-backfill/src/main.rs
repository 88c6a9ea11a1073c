use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = thoughtline_backfill::Args::parse();

	thoughtline_backfill::run(args).await
}
