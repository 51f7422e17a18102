mod config;

use anyhow::{Context, Result};
use browser::{format_currency, format_number, FetchOutcome, PageController, PageStats, PageView};
use catalog::{parse_payload, Channel, MemoryStore, Quality, SortDirection, SortField};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use config::AppConfig;
use query::{params, CountEstimator, FilterSpec, SortSpec};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Channel Browser - filter, sort and page through YouTube channel data
#[derive(Parser)]
#[command(name = "channel-browser")]
#[command(about = "Browse channel records with filtering, sorting and cursor paging", long_about = None)]
struct Cli {
    /// Path to the channel dataset (JSON array)
    #[arg(short, long, env = "CHANNELS_DATASET")]
    dataset: Option<PathBuf>,

    /// Collection the dataset is loaded into
    #[arg(long, env = "CHANNELS_COLLECTION", default_value = browser::DEFAULT_COLLECTION)]
    collection: String,

    /// Quiet period before a filter change triggers a fetch
    #[arg(long, env = "CHANNELS_DEBOUNCE_MS", default_value_t = 300)]
    debounce_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of channels
    Browse {
        #[command(flatten)]
        filters: FilterArgs,

        /// Start from a saved query string, e.g. "minRev=1000&sort=rpm"
        #[arg(long)]
        query: Option<String>,

        /// Page to show (reached by paging forward from page 1)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Print summary statistics for the page
        #[arg(long)]
        stats: bool,
    },

    /// Estimate how many channels match the filters
    Count {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List the category tags available for filtering
    Categories,

    /// Merge an exported payload into the dataset
    Ingest {
        /// JSON payload: an array, or an object with `data` or `channels`
        #[arg(long)]
        input: PathBuf,
    },

    /// Write a synthetic dataset
    Generate {
        /// Number of channels to generate
        #[arg(long, default_value = "1000")]
        count: u64,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive search over titles and category tags
    #[arg(long)]
    search: Option<String>,

    /// Category tags (comma separated, any may match)
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,

    /// Quality buckets: low, mid, high (comma separated)
    #[arg(long, value_delimiter = ',')]
    quality: Vec<Quality>,

    #[arg(long)]
    monetized: Option<bool>,

    #[arg(long)]
    faceless: Option<bool>,

    #[arg(long)]
    shorts: Option<bool>,

    #[arg(long)]
    min_subs: Option<u64>,

    #[arg(long)]
    max_subs: Option<u64>,

    #[arg(long)]
    min_rev: Option<f64>,

    #[arg(long)]
    max_rev: Option<f64>,

    /// Sort field, e.g. subscribers, avgMonthlyRevenue, rpm
    #[arg(long)]
    sort: Option<SortField>,

    /// Sort direction: asc or desc
    #[arg(long)]
    dir: Option<SortDirection>,
}

impl FilterArgs {
    /// Override `base` with every flag that was given
    fn apply(self, mut filters: FilterSpec, mut sort: SortSpec) -> (FilterSpec, SortSpec) {
        if let Some(search) = self.search {
            filters.search = search;
        }
        if !self.categories.is_empty() {
            filters.categories = self.categories;
        }
        if !self.quality.is_empty() {
            filters.quality = self.quality;
        }
        filters.is_monetized = self.monetized.or(filters.is_monetized);
        filters.is_faceless = self.faceless.or(filters.is_faceless);
        filters.has_shorts = self.shorts.or(filters.has_shorts);
        filters.min_subscribers = self.min_subs.or(filters.min_subscribers);
        filters.max_subscribers = self.max_subs.or(filters.max_subscribers);
        filters.min_revenue = self.min_rev.or(filters.min_revenue);
        filters.max_revenue = self.max_rev.or(filters.max_revenue);
        if let Some(field) = self.sort {
            sort.field = field;
        }
        if let Some(direction) = self.dir {
            sort.direction = direction;
        }
        (filters, sort)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.dataset, cli.collection, cli.debounce_ms)
        .context("Invalid configuration")?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Browse {
            filters,
            query,
            page,
            stats,
        } => handle_browse(&config, filters, query, page, stats).await?,
        Commands::Count { filters } => handle_count(&config, filters).await?,
        Commands::Categories => handle_categories(&config).await?,
        Commands::Ingest { input } => handle_ingest(&config, &input)?,
        Commands::Generate { count } => handle_generate(&config, count)?,
    }

    Ok(())
}

fn load_store(config: &AppConfig) -> Result<Arc<MemoryStore>> {
    let path = config.existing_dataset()?;
    println!("Loading channels from {}...", path.display());
    let start = Instant::now();
    let store = MemoryStore::load_from_file(path, &config.collection)
        .context("Failed to load channel dataset")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    Ok(Arc::new(store))
}

/// Handle the 'browse' command
async fn handle_browse(
    config: &AppConfig,
    args: FilterArgs,
    query: Option<String>,
    page: u32,
    show_stats: bool,
) -> Result<()> {
    let store = load_store(config)?;

    let (base_filters, base_sort) = query
        .as_deref()
        .map(params::from_query_string)
        .unwrap_or_default();
    let (filters, sort) = args.apply(base_filters, base_sort);

    let controller = PageController::with_specs(store, config.controller(), filters.clone(), sort);
    controller.refresh().await.context("Failed to fetch first page")?;

    while controller.view().page_number < page {
        match controller.advance().await.context("Failed to fetch next page")? {
            FetchOutcome::Published => {}
            outcome => {
                warn!("Stopped paging at page {} ({:?})", controller.view().page_number, outcome);
                break;
            }
        }
    }

    let view = controller.view();
    print_page(&view, &sort);
    if show_stats {
        print_stats(&PageStats::compute(&view.channels));
    }

    let query_string = params::to_query_string(&filters, &sort);
    if !query_string.is_empty() {
        println!("{} {}", "Query:".dimmed(), query_string);
    }
    Ok(())
}

/// Handle the 'count' command
async fn handle_count(config: &AppConfig, args: FilterArgs) -> Result<()> {
    let store = load_store(config)?;
    let (filters, _) = args.apply(FilterSpec::default(), SortSpec::default());

    let estimator = CountEstimator::new(store, config.collection.clone());
    let count = estimator.estimate(&filters).await;

    println!(
        "{} {} channels ({} pages)",
        "≈".yellow(),
        count.to_string().bold(),
        browser::total_pages(count)
    );
    if !filters.search.is_empty() || !filters.categories.is_empty() {
        println!("{}", "Search and category filters are not reflected in the count".dimmed());
    }
    Ok(())
}

/// Handle the 'categories' command
async fn handle_categories(config: &AppConfig) -> Result<()> {
    let store = load_store(config)?;
    let controller = PageController::new(store, config.controller());

    let categories = controller.categories().await;
    println!("{}", format!("{} categories:", categories.len()).bold().blue());
    for category in categories {
        println!("  - {}", category);
    }
    Ok(())
}

/// Handle the 'ingest' command
fn handle_ingest(config: &AppConfig, input: &Path) -> Result<()> {
    let body = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read payload {}", input.display()))?;
    let fetched_at = chrono::Utc::now().to_rfc3339();
    let batch = parse_payload(&body, &fetched_at).context("Failed to parse payload")?;
    if batch.skipped > 0 {
        warn!("Skipped {} records without an id", batch.skipped);
    }

    let store = if config.dataset.is_file() {
        MemoryStore::load_from_file(&config.dataset, &config.collection)
            .context("Failed to load existing dataset")?
    } else {
        info!("Creating new dataset at {}", config.dataset.display());
        MemoryStore::new()
    };

    let upserted = store.merge_upsert(&config.collection, batch.records)?;
    let total = store
        .save_to_file(&config.collection, &config.dataset)
        .context("Failed to write dataset")?;

    println!(
        "{} Merged {} channels ({} total) into {}",
        "✓".green(),
        upserted,
        total,
        config.dataset.display()
    );
    Ok(())
}

/// Handle the 'generate' command
fn handle_generate(config: &AppConfig, count: u64) -> Result<()> {
    const TAGS: [&str; 8] = [
        "Gaming", "Education", "Cooking", "Music", "Tech", "Travel", "Finance", "Fitness",
    ];
    let mut rng = rand::rng();

    let channels: Vec<Channel> = (1..=count)
        .map(|id| {
            let subscribers = rng.random_range(1_000..5_000_000u64);
            let rpm = rng.random_range(0.5..12.0);
            let avg_monthly_views = subscribers as f64 * rng.random_range(0.2..3.0);
            let primary = TAGS[rng.random_range(0..TAGS.len())];
            let secondary = TAGS[rng.random_range(0..TAGS.len())];
            let mut categories = vec![primary.to_string()];
            if secondary != primary {
                categories.push(secondary.to_string());
            }
            let quality = Quality::ALL[rng.random_range(0..Quality::ALL.len())];
            let days_since_start = rng.random_range(90..4000u32);
            let num_of_uploads = rng.random_range(10..2000u32);
            let avg_monthly_revenue = avg_monthly_views / 1000.0 * rpm;

            Channel {
                id: id.into(),
                title: format!("{} Channel {}", primary, id),
                url: format!("https://www.youtube.com/channel/{id}"),
                subscribers,
                avg_view_per_video: avg_monthly_views / 4.0,
                median_view_per_video: avg_monthly_views / 6.0,
                days_since_start,
                num_of_uploads,
                is_monetized: subscribers >= 1_000 && rng.random_bool(0.8),
                rpm,
                avg_monthly_revenue,
                category: Some(primary.to_string()),
                categories,
                is_faceless: rng.random_bool(0.3),
                quality,
                avg_monthly_views,
                total_views: (avg_monthly_views * days_since_start as f64 / 30.0) as u64,
                total_revenue_generated: avg_monthly_revenue * days_since_start as f64 / 30.0,
                days_since_last_upload: rng.random_range(0..60u32),
                has_shorts: rng.random_bool(0.5),
                avg_video_length: rng.random_range(60.0..3600.0),
                outlier_score: rng.random_range(0.0..10.0),
                avg_monthly_upload_frequency: num_of_uploads as f64 * 30.0 / days_since_start as f64,
                ..Default::default()
            }
        })
        .collect();

    let store = MemoryStore::new();
    store.upsert(&config.collection, channels)?;
    let written = store
        .save_to_file(&config.collection, &config.dataset)
        .context("Failed to write dataset")?;

    println!(
        "{} Generated {} channels into {}",
        "✓".green(),
        written,
        config.dataset.display()
    );
    Ok(())
}

/// Print one page as a table
fn print_page(view: &PageView, sort: &SortSpec) {
    println!(
        "{}",
        format!(
            "Page {} of {} ({} channels, sorted by {} {})",
            view.page_number,
            view.total_pages.max(1),
            view.total_count,
            sort.field,
            sort.direction
        )
        .bold()
        .blue()
    );

    if view.channels.is_empty() {
        println!("  {}", "No channels on this page".dimmed());
    }
    for channel in &view.channels {
        let flags = format!(
            "{}{}{}",
            if channel.is_monetized { "$" } else { "-" },
            if channel.is_faceless { "F" } else { "-" },
            if channel.has_shorts { "S" } else { "-" },
        );
        println!(
            "{:>8}  {:<40} {:>9} subs  {:>14}/mo  RPM {:>7}  {:<4} {}  [{}]",
            channel.id.to_string().green(),
            truncate(&channel.title, 40),
            format_number(channel.subscribers as f64),
            format_currency(channel.avg_monthly_revenue),
            format_currency(channel.rpm),
            channel.quality,
            flags,
            channel.categories.join(", ")
        );
    }

    let prev = if view.has_prev { "← prev" } else { "" };
    let next = if view.has_next { "next →" } else { "" };
    println!("{:<10}{:>10}", prev.cyan(), next.cyan());
}

fn print_stats(stats: &PageStats) {
    println!("{}", "Page statistics:".bold().blue());
    println!("{}Channels: {}", "• ".green(), stats.total_channels);
    println!(
        "{}Subscribers: {} (avg {})",
        "• ".green(),
        format_number(stats.total_subscribers as f64),
        format_number(stats.avg_subscribers)
    );
    println!(
        "{}Revenue: {} (avg {}/mo)",
        "• ".green(),
        format_currency(stats.total_revenue),
        format_currency(stats.avg_monthly_revenue)
    );
    println!("{}Total views: {}", "• ".green(), format_number(stats.total_views as f64));
    println!("{}Avg RPM: {}", "• ".green(), format_currency(stats.avg_rpm));
    println!(
        "{}Monetized: {}/{} ({} faceless)",
        "• ".cyan(),
        stats.monetized_count,
        stats.total_channels,
        stats.faceless_count
    );
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max - 1).collect();
        format!("{cut}…")
    }
}
