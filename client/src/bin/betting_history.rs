//! Betting history tool - processes a raw indexer snapshot for one address.
//!
//! Usage:
//!   cargo run --release --bin betting-history -- list --snapshot raw.json --address 0x...
//!   cargo run --release --bin betting-history -- stats --snapshot raw.json --address 0x... --outcome won
//!   cargo run --release --bin betting-history -- export --snapshot raw.json --address 0x... --format csv --out-dir .
//!   cargo run --release --bin betting-history -- filters reset

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use shibplay_client::{load_history, Config, SnapshotSource};
use shibplay_history::{
    export, export_filename, has_active_filters, load_persisted, FileStore, HistoryView,
    KeyValueStore,
};
use shibplay_types::{
    constants::FILTER_STORAGE_KEY, AmountRange, BetRecord, BetTypeFilter, DatePreset, DateRange,
    ExportFormat, FilterState, HistoryError, OutcomeFilter, RoundStatusFilter, SortDirection,
    SortField, SortState, UserStatistics,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and export ShibPlay betting history")]
struct Cli {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `state_dir` from the configuration.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Emit structured JSON logs.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of filtered, sorted records as JSON.
    List {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        view: ViewArgs,
        /// Number of pages to reveal.
        #[arg(long, default_value = "1")]
        pages: usize,
    },
    /// Print statistics over the filtered records.
    Stats {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Write filtered records to a CSV or JSON file.
    Export {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value = "csv", value_parser = parse_format)]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Inspect or reset persisted filter/sort state.
    Filters {
        #[command(subcommand)]
        action: FiltersAction,
    },
}

#[derive(Subcommand, Debug)]
enum FiltersAction {
    Show,
    Reset,
}

#[derive(Args, Debug)]
struct Input {
    /// Raw indexer snapshot (JSON).
    #[arg(long)]
    snapshot: PathBuf,
    /// Bettor address.
    #[arg(long)]
    address: String,
}

/// Filter and sort overrides. Anything omitted falls back to the persisted
/// state.
#[derive(Args, Debug)]
struct ViewArgs {
    #[arg(long, value_parser = parse_with(OutcomeFilter::parse))]
    outcome: Option<OutcomeFilter>,
    #[arg(long, value_parser = parse_with(BetTypeFilter::parse))]
    bet_type: Option<BetTypeFilter>,
    #[arg(long, value_parser = parse_with(RoundStatusFilter::parse))]
    round_status: Option<RoundStatusFilter>,
    /// One of all, 7d, 30d, 90d, custom.
    #[arg(long, value_parser = parse_with(DatePreset::parse))]
    date: Option<DatePreset>,
    /// Custom range start (unix seconds).
    #[arg(long)]
    start: Option<i64>,
    /// Custom range end (unix seconds).
    #[arg(long)]
    end: Option<i64>,
    #[arg(long)]
    min_amount: Option<f64>,
    #[arg(long)]
    max_amount: Option<f64>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_with(SortField::parse))]
    sort: Option<SortField>,
    #[arg(long, value_parser = parse_with(SortDirection::parse))]
    direction: Option<SortDirection>,
}

impl ViewArgs {
    fn overrides_filters(&self) -> bool {
        self.outcome.is_some()
            || self.bet_type.is_some()
            || self.round_status.is_some()
            || self.date.is_some()
            || self.start.is_some()
            || self.end.is_some()
            || self.min_amount.is_some()
            || self.max_amount.is_some()
            || self.search.is_some()
    }

    fn apply_filters(&self, current: &FilterState) -> FilterState {
        let date_range = if self.start.is_some() || self.end.is_some() {
            DateRange::custom(self.start, self.end)
        } else {
            self.date
                .map(DateRange::preset)
                .unwrap_or(current.date_range)
        };
        let amount_range = if self.min_amount.is_some() || self.max_amount.is_some() {
            AmountRange::new(self.min_amount, self.max_amount)
        } else {
            current.amount_range
        };
        FilterState {
            outcome: self.outcome.unwrap_or(current.outcome),
            bet_type: self.bet_type.unwrap_or(current.bet_type),
            round_status: self.round_status.unwrap_or(current.round_status),
            date_range,
            amount_range,
            search: self.search.clone().unwrap_or_else(|| current.search.clone()),
        }
    }

    fn apply_sort(&self, current: &SortState) -> SortState {
        SortState {
            field: self.sort.unwrap_or(current.field),
            direction: self.direction.unwrap_or(current.direction),
        }
    }
}

fn parse_with<T: Clone + Send + Sync + 'static>(
    parse: fn(&str) -> Option<T>,
) -> impl Fn(&str) -> Result<T, String> + Clone + Send + Sync + 'static {
    move |value: &str| parse(value).ok_or_else(|| format!("unrecognized value {value:?}"))
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(value).ok_or_else(|| format!("unsupported export format {value:?}"))
}

#[derive(Serialize)]
struct Page<'a> {
    total: usize,
    has_more: bool,
    records: &'a [BetRecord],
    warnings: &'a [HistoryError],
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    statistics: &'a UserStatistics,
    warnings: &'a [HistoryError],
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn open_view(
    config: &Config,
    store: FileStore,
    input: &Input,
    args: &ViewArgs,
) -> Result<(HistoryView<FileStore>, Vec<HistoryError>)> {
    let source = SnapshotSource::new(&input.snapshot);
    let report = load_history(&source, &input.address, &config.processing);
    if let shibplay_types::Report::Failed(err) = &report {
        anyhow::bail!("could not load betting history: {err}");
    }
    let (records, mut warnings) = report.into_parts();

    let mut view = HistoryView::open(store, records, config.page_size, config.search_debounce())
        .context("Failed to load persisted filters")?;
    if args.overrides_filters() {
        let filters = args.apply_filters(view.filters());
        view.set_filters(filters).context("Failed to persist filters")?;
    }
    let sort = args.apply_sort(view.sort());
    if &sort != view.sort() {
        view.set_sort(sort).context("Failed to persist sort")?;
    }
    warnings.extend(view.take_warnings());
    for warning in &warnings {
        warn!(%warning, "degraded input");
    }
    Ok((view, warnings))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).context("Could not load config file")?,
        None => Config::default(),
    };
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }
    let level = config.level().context("Invalid log level")?;
    if cli.json_logs || config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    }

    let store = FileStore::open(&config.state_dir)
        .with_context(|| format!("Could not open state dir {}", config.state_dir.display()))?;
    let now = Utc::now().timestamp();

    match cli.command {
        Command::List { input, view, pages } => {
            let (mut view, warnings) = open_view(&config, store, &input, &view)?;
            for _ in 1..pages {
                if !view.load_more(now) {
                    break;
                }
            }
            let records = view.visible(now);
            print_json(&Page {
                total: view.results(now).len(),
                has_more: view.has_more(now),
                records: &records,
                warnings: &warnings,
            })?;
        }
        Command::Stats { input, view } => {
            let (view, mut warnings) = open_view(&config, store, &input, &view)?;
            let (statistics, stats_warnings) = view.statistics(now).into_parts();
            warnings.extend(stats_warnings);
            print_json(&StatsOutput {
                statistics: &statistics,
                warnings: &warnings,
            })?;
        }
        Command::Export {
            input,
            view,
            format,
            out_dir,
        } => {
            let (view, _) = open_view(&config, store, &input, &view)?;
            let records = view.results(now);
            let payload = export(&records, format).context("Failed to build export")?;
            let filename = export_filename(
                format,
                has_active_filters(view.filters()),
                Utc::now().date_naive(),
            );
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Could not create {}", out_dir.display()))?;
            let path = out_dir.join(filename);
            std::fs::write(&path, payload)
                .with_context(|| format!("Could not write {}", path.display()))?;
            info!(path = %path.display(), records = records.len(), %format, "exported history");
            println!("{}", path.display());
        }
        Command::Filters { action } => match action {
            FiltersAction::Show => {
                let mut store = store;
                let loaded = load_persisted(&mut store).context("Failed to load filters")?;
                for warning in &loaded.warnings {
                    warn!(%warning, "corrected persisted filters");
                }
                let active = has_active_filters(&loaded.filters);
                print_json(&serde_json::json!({
                    "filters": loaded.filters,
                    "sort": loaded.sort,
                    "active": active,
                }))?;
            }
            FiltersAction::Reset => {
                let mut store = store;
                store
                    .remove(FILTER_STORAGE_KEY)
                    .context("Failed to reset filters")?;
                info!("reset persisted filters");
            }
        },
    }
    Ok(())
}
