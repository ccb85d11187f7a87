use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = askads_api::Args::parse();

	askads_api::run(args).await
}
