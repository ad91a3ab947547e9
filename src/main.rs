//! Poolwatch CLI entry point.

use clap::Parser;

use poolwatch::cli::{commands, context::AppContext, handle_error, Cli, Commands};
use poolwatch::infrastructure::config::ConfigLoader;
use poolwatch::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    if let Err(err) = logging::init(&config.logging) {
        handle_error(err, cli.json);
    }

    let ctx = match AppContext::from_config(config).await {
        Ok(ctx) => ctx,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Run => commands::run::execute(ctx, cli.json).await,
        Commands::Once => commands::once::execute(ctx, cli.json).await,
        Commands::List { limit } => commands::list::execute(ctx, limit, cli.json).await,
        Commands::Search {
            query,
            threshold,
            top_k,
        } => commands::search::execute(ctx, &query, threshold, top_k, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
