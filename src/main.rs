//! ecopack - plugin release and packaging automation
//!
//! Creates tagged releases for plugin repositories, publishes wagons and plugin
//! YAMLs to object storage, keeps the plugins registry document current and
//! assembles the combined plugins bundle.

use clap::Parser;

mod asset;
mod bundle;
mod cli;
mod commands;
mod config;
mod error;
mod hash;
mod http;
mod logging;
mod manager;
mod marketplace;
mod progress;
mod registry;
mod release;
mod retry;
mod runtime;
mod storage;
mod temp;
mod validate;
mod version;
mod workspace;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Release(args) => commands::release::run(cli.config, args),
        Commands::Upload(args) => commands::upload::run(cli.config, args),
        Commands::Registry(args) => commands::registry::run(cli.config, args),
        Commands::Bundle(args) => commands::bundle::run(cli.config, args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Manager(args) => commands::manager::run(cli.config, args),
        Commands::Notify(args) => commands::notify::run(cli.config, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
