use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = thoughtline_api::Args::parse();

	thoughtline_api::run(args).await
}
