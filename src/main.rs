use anyhow::Result;
use clap::Parser;
use mentor_nusantara::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    mentor_nusantara::run(args).await
}
