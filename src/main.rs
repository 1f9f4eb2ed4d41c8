use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kbnb::index::stats::{CatalogStats, show_stats};
use kbnb::index::{PrefixIndex, PropertySource};
use kbnb::output::{GridPage, print_grid_page, print_hosts, print_matches};
use kbnb::query::{FilterCriteria, FilterEngine, compute_host_aggregates, parse_filter_query};
use kbnb::utils::{AppConfig, get_config_path};
use rustc_hash::FxHashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kbnb")]
#[command(about = "Search and filter rental property listings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Name prefix to search for (when no subcommand is given)
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Property data file (JSON array)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// When to color output
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    color: ColorWhen,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Type-ahead search over property names
    Search {
        /// Name prefix
        text: String,

        /// Maximum matches to show (0 = unlimited)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Filter listings and show one page of the grid
    Filter {
        /// Filter expression, e.g. `loc:US rate:0-150 stars:>=4 superhost`
        expr: Vec<String>,

        /// Page to show (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Listings per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Criteria file in JSON; expression fields take precedence
        #[arg(long)]
        criteria: Option<PathBuf>,

        /// Emit the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show per-host rating aggregates
    Hosts {
        /// Only list Super Hosts
        #[arg(long)]
        super_only: bool,
    },
    /// Show catalogue statistics
    Stats {
        /// Emit statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorWhen {
    Auto,
    Always,
    Never,
}

impl ColorWhen {
    fn choice(self) -> ColorChoice {
        match self {
            ColorWhen::Auto => ColorChoice::Auto,
            ColorWhen::Always => ColorChoice::Always,
            ColorWhen::Never => ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load()?;
    if let Some(data) = cli.data {
        config.data_path = Some(data);
    }
    let mut out = StandardStream::stdout(cli.color.choice());

    match cli.command {
        Some(Commands::Search { text, limit }) => {
            let limit = limit.unwrap_or(config.search_limit);
            run_search(&mut out, &config, &text, limit)?;
        }
        Some(Commands::Filter {
            expr,
            page,
            page_size,
            criteria,
            json,
        }) => {
            let page_size = page_size
                .filter(|&n| n > 0)
                .unwrap_or_else(|| config.effective_page_size());
            run_filter(
                &mut out,
                &config,
                &expr.join(" "),
                criteria.as_deref(),
                page,
                page_size,
                json,
            )?;
        }
        Some(Commands::Hosts { super_only }) => {
            let source = load_source(&config)?;
            let mut hosts: Vec<_> = compute_host_aggregates(source.records())
                .into_iter()
                .filter(|(_, aggregate)| !super_only || aggregate.is_super_host())
                .collect();
            hosts.sort_by(|a, b| {
                b.1.average_stars()
                    .total_cmp(&a.1.average_stars())
                    .then(a.0.cmp(&b.0))
            });
            print_hosts(&mut out, &hosts)?;
        }
        Some(Commands::Stats { json }) => {
            let source = load_source(&config)?;
            let index = PrefixIndex::build_with_config(source.records(), &config.index_config());
            let stats = CatalogStats::collect(&source, &index);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                show_stats(&stats);
            }
        }
        Some(Commands::Config { init }) => {
            let path = if init { config.save()? } else { get_config_path()? };
            println!("Config file: {}", path.display());
            println!("Data file:   {}", config.effective_data_path()?.display());
            println!();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        None => {
            let text = cli.query.join(" ");
            run_search(&mut out, &config, &text, config.search_limit)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kbnb=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_source(config: &AppConfig) -> Result<PropertySource> {
    let path = config.effective_data_path()?;
    PropertySource::open(&path)
        .with_context(|| format!("Failed to load properties from {}", path.display()))
}

fn run_search(
    out: &mut StandardStream,
    config: &AppConfig,
    text: &str,
    limit: usize,
) -> Result<()> {
    let source = load_source(config)?;
    let index = PrefixIndex::build_with_config(source.records(), &config.index_config());
    let matches = index.query_with_limit(text, limit);
    print_matches(out, &matches)?;
    Ok(())
}

fn run_filter(
    out: &mut StandardStream,
    config: &AppConfig,
    expr: &str,
    criteria_file: Option<&Path>,
    page: usize,
    page_size: usize,
    json: bool,
) -> Result<()> {
    let source = load_source(config)?;
    let query = parse_filter_query(expr);

    let criteria = match criteria_file {
        Some(path) => read_criteria(path)?.merge(query.criteria),
        None => query.criteria,
    };
    debug!(?criteria, text = %query.text, "filter criteria");

    let engine = FilterEngine::with_cache(config.super_host_cache_size);
    let mut filtered = engine.apply(source.records(), &criteria);

    if !query.text.is_empty() {
        let index = PrefixIndex::build_with_config(source.records(), &config.index_config());
        let ids: FxHashSet<_> = index.query_ids(&query.text).into_iter().collect();
        filtered.retain(|p| ids.contains(&p.id));
    }

    let grid = GridPage::new(&filtered, page, page_size);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&grid)?)?;
    } else {
        print_grid_page(out, &grid)?;
    }
    Ok(())
}

fn read_criteria(path: &Path) -> Result<FilterCriteria> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read criteria file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse criteria file {}", path.display()))
}
