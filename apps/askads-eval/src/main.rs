use clap::Parser;

use askads_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	askads_eval::run(args).await
}
