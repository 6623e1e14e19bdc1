mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands, ConfigAction},
    commands::{CommandExecutor, SearchArgs},
    config::AppConfig,
};
use anyhow::Context;
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json_errors = args.output.is_json();

    if let Err(e) = run(args).await {
        if json_errors {
            let error_json = serde_json::json!({
                "status": "error",
                "message": format!("{e:#}"),
            });
            println!("{error_json}");
        } else {
            error!("Application error: {:#}", e);
            #[cfg(feature = "colored-output")]
            {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            }
            #[cfg(not(feature = "colored-output"))]
            {
                eprintln!("Error: {:#}", e);
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    init_logging(args.verbose, args.quiet);

    let config_path = args.config.as_deref();
    let command = match args.command {
        // config commands must work even when the file is broken
        Commands::Config { action } => {
            match action {
                ConfigAction::Reset => {
                    AppConfig::reset(config_path)?;
                    println!("✓ Configuration reset to defaults");
                }
                ConfigAction::Show => {
                    let config = AppConfig::load(config_path)?;
                    println!("{}", config.show()?);
                }
            }
            return Ok(());
        }
        command => command,
    };

    let config = AppConfig::load(config_path).context("Failed to load configuration")?;
    debug!(?config, "Loaded configuration");

    let executor = CommandExecutor::new(&config, args.output)
        .context("Failed to initialize video sources")?;

    match command {
        Commands::Search {
            query,
            page,
            sort,
            date,
            duration,
            result_type,
        } => {
            executor
                .search(SearchArgs {
                    query,
                    page,
                    sort,
                    date,
                    duration,
                    result_type,
                })
                .await?
        }
        Commands::Trending { region, category } => {
            executor
                .trending(region.as_deref(), category.as_deref())
                .await?
        }
        Commands::Video { video } => executor.video(&video).await?,
        Commands::Channel { id } => executor.channel(&id).await?,
        Commands::Stream { video } => executor.stream(&video).await?,
        Commands::Embed { video } => executor.embed(&video)?,
        Commands::Instances { action } => executor.instances(action).await?,
        Commands::History { clear } => executor.history(clear)?,
        Commands::Cache => executor.cache()?,
        Commands::Key { action } => executor.key(action)?,
        Commands::Source { source } => executor.source(source)?,
        Commands::Settings {
            region,
            max_results,
            theme,
        } => executor.settings(region, max_results, theme)?,
        Commands::Reset { videos_only } => executor.reset(videos_only)?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}
