use clap::Parser;
use pmp_llm_bench::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap(cli.base_url.clone());

    match cli.command {
        Command::Models => cli::models::run(&config).await,
        Command::Pull(args) => cli::pull::run(&config, args).await,
        Command::Run(args) => cli::run::run(&config, args).await,
    }
}
