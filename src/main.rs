//! Sumi-Trawl main entry point
//!
//! This is the command-line interface for the Sumi-Trawl page scraper.

use clap::Parser;
use std::path::PathBuf;
use sumi_trawl::config::{load_config_with_hash, Config, FieldConfig};
use sumi_trawl::output::{write_csv, write_rows};
use sumi_trawl::query::Query;
use sumi_trawl::ScraperBuilder;
use tracing_subscriber::EnvFilter;

/// Sumi-Trawl: a small, polite page scraper
///
/// Sumi-Trawl resolves index pages into a list of instance pages, fetches
/// each one with a fixed delay (optionally through an on-disk stash) and
/// extracts the configured fields into CSV rows.
#[derive(Parser, Debug)]
#[command(name = "sumi-trawl")]
#[command(version)]
#[command(about = "A small, polite page scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Write CSV here instead of [output].csv-path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_scrape(config, cli.output).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_trawl=info,warn"),
            1 => EnvFilter::new("sumi_trawl=debug,info"),
            2 => EnvFilter::new("sumi_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be scraped
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Trawl Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Delay: {}ms", config.scraper.delay_ms);
    println!("  Cache dir: {}", config.scraper.cache_dir.display());
    println!("  Cache index pages: {}", config.scraper.cache_index);
    println!("  Stash instance pages: {}", config.scraper.stash);
    match config.scraper.timeout_secs {
        Some(secs) => println!("  Timeout: {}s", secs),
        None => println!("  Timeout: none"),
    }
    match config.scraper.max_pages {
        Some(max) => println!("  Max pages per document: {}", max),
        None => println!("  Max pages per document: unbounded"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    if let Some(index) = &config.index {
        println!(
            "\nIndex URLs ({}), links via {} '{}':",
            index.urls.len(),
            index.selector_method,
            index.selector
        );
        for url in &index.urls {
            println!("  - {}", url);
        }
    }

    if let Some(instances) = &config.instances {
        println!("\nInstance URLs ({}):", instances.urls.len());
        for url in &instances.urls {
            println!("  - {}", url);
        }
    }

    println!("\nFields ({}):", config.fields.len());
    for field in &config.fields {
        match &field.attribute {
            Some(attr) => println!(
                "  - {}: @{} of {} '{}'",
                field.name, attr, field.selector_method, field.selector
            ),
            None => println!(
                "  - {}: text of {} '{}'",
                field.name, field.selector_method, field.selector
            ),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// A compiled `[[field]]` entry
struct Field {
    query: Query,
    attribute: Option<String>,
}

impl Field {
    fn compile(config: &FieldConfig) -> Result<Self, sumi_trawl::QueryError> {
        Ok(Self {
            query: Query::compile(&config.selector, config.selector_method)?,
            attribute: config.attribute.clone(),
        })
    }

    /// All matches joined into one cell
    ///
    /// A query that fails to evaluate is an error: the selector needs fixing,
    /// and carrying on would only produce blank columns.
    fn extract(&self, body: &str) -> Result<String, sumi_trawl::QueryError> {
        let values = match &self.attribute {
            Some(attr) => self.query.select_attr(body, attr)?,
            None => self.query.select_text(body)?,
        };

        Ok(values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" | "))
    }
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: Config,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fields = config
        .fields
        .iter()
        .map(Field::compile)
        .collect::<Result<Vec<_>, _>>()?;

    let builder = match (&config.index, &config.instances) {
        (Some(index), _) => ScraperBuilder::from_index_urls(
            index.urls.clone(),
            &index.selector,
            index.selector_method,
        )
        .absolute_links(index.absolute_links),
        (None, Some(instances)) => ScraperBuilder::from_instances(instances.urls.clone()),
        (None, None) => return Err("one of [index] or [instances] is required".into()),
    };

    let mut scraper = builder
        .config(config.scraper.clone())
        .user_agent(config.user_agent.clone())
        .build()?;

    let instance_count = scraper.instance_urls().await?.len();
    tracing::info!("Scraping {} instances", instance_count);

    let process = |body: &str, url: &str, _position: usize| {
        std::iter::once(Ok(url.to_string()))
            .chain(fields.iter().map(|field| field.extract(body)))
            .collect::<Result<Vec<String>, _>>()
    };

    let mut header = vec!["url".to_string()];
    header.extend(config.fields.iter().map(|f| f.name.clone()));

    let mut rows = scraper.try_run(process).await?;
    rows.insert(0, header);

    match output.or_else(|| config.output.csv_path.clone()) {
        Some(path) => {
            write_csv(&path, &rows)?;
            println!("✓ Wrote {} rows to {}", rows.len() - 1, path.display());
        }
        None => write_rows(std::io::stdout().lock(), b'\t', &rows)?,
    }

    Ok(())
}
