mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            source,
            no_annotations,
            query,
        } => commands::render_source(&source, &query, !no_annotations),
        Commands::Show {
            source,
            query,
            effective,
            output_type,
        } => commands::show(&source, &query, effective, output_type),
        Commands::Check { source } => commands::check(&source),
        Commands::Deploy {
            source,
            destinations,
            skel,
            policy,
            create_dirs,
            no_annotations,
            config,
        } => commands::deploy(commands::DeployArgs {
            source,
            destinations,
            skel,
            policy,
            create_dirs,
            no_annotations,
            config,
        }),
        Commands::Profiles { skel } => commands::list_profiles(&skel),
    }
}

/// Log to stderr so rendered output on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
