use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "venuemap")]
#[command(about = "Search, filter and select venues on a map")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List filter categories and their options
    Catalog,
    /// Show autocomplete suggestions for partial input
    Suggest {
        /// Partial query text
        text: String,
    },
    /// Run a full search and print the places that pass the filters
    Search {
        /// Free-text query
        text: String,
        /// Filter as `category=option` (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Select a result by place id, as if its marker were clicked
        #[arg(long)]
        select: Option<String>,
        /// Open the detail panel for the selected place
        #[arg(long, requires = "select")]
        details: bool,
    },
    /// Recenter the map on the current position
    Locate,
}

/// Parses `category=option`. Whitespace around either side is ignored.
fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (category, option) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected category=option, got '{raw}'"))?;
    let (category, option) = (category.trim(), option.trim());
    if category.is_empty() || option.is_empty() {
        return Err(format!("expected category=option, got '{raw}'"));
    }
    Ok((category.to_owned(), option.to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = venuemap_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("venuemap ready (env: {}); see --help", config.env);
        return Ok(());
    };

    let catalog = commands::load_catalog(&config)?;
    match command {
        Commands::Catalog => commands::run_catalog(&catalog),
        Commands::Suggest { text } => {
            let mut coordinator = commands::build_coordinator(&config, catalog)?;
            commands::run_suggest(&mut coordinator, &text).await;
        }
        Commands::Search {
            text,
            filters,
            select,
            details,
        } => {
            let mut coordinator = commands::build_coordinator(&config, catalog)?;
            commands::run_search(
                &mut coordinator,
                &text,
                &filters,
                select.as_deref(),
                details,
            )
            .await;
        }
        Commands::Locate => {
            let mut coordinator = commands::build_coordinator(&config, catalog)?;
            commands::run_locate(&mut coordinator).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
