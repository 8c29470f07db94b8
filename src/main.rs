use clap::Parser;
use tracing_subscriber::EnvFilter;

mod assignment;
mod cli;
mod core;
mod export;
mod matching;
mod parsing;
mod utils;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over the verbosity flag when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("room_solver=debug,info")
        } else {
            EnvFilter::new("room_solver=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let workspace = cli.workspace.as_path();

    match cli.command {
        cli::Commands::Import(args) => {
            cli::import::run(args, workspace, cli.format, cli.verbose)?;
        }
        cli::Commands::Assign(args) => {
            cli::assign::run(args, workspace, cli.format, cli.verbose)?;
        }
        cli::Commands::Validate => {
            cli::validate::run(workspace, cli.format)?;
        }
        cli::Commands::Arrange(args) => {
            cli::arrange::run(args, workspace, cli.format, cli.verbose)?;
        }
        cli::Commands::Room(args) => {
            cli::room::run(args, workspace, cli.format)?;
        }
        cli::Commands::Export(args) => {
            cli::export::run(args, workspace, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, workspace)?;
        }
    }

    Ok(())
}
