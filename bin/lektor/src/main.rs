use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Clone)]
#[clap(version, about)]
struct LektorArgs {
    /// Debug output
    #[clap(long, global = true, alias = "debug")]
    verbose: bool,

    #[clap(subcommand)]
    command: commands::LektorCommand,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = LektorArgs::parse();

    let default_directive = if args.verbose {
        "lektor=debug,lektor_soundcloud=debug"
    } else {
        "lektor=info,lektor_soundcloud=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    args.command.run().await
}
