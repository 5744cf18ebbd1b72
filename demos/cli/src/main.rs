use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use clinic_core::{CategoryFilter, ClinicConfig, FilterCriteria, SortOrder, TimeWindow};
use clinic_json::{
    filter_collection_value, parse_datetime, search_payload_value, summarize_dashboard_str,
    CollectionKind, DashboardFilters,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "clinic-cli",
    about = "Filter and summarize dental clinic records exported as JSON."
)]
struct Cli {
    /// JSON file overriding payroll rates, lab stages or the default window.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference instant (RFC 3339); defaults to the current time.
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize every collection of a dashboard payload.
    Dashboard {
        /// Path to the payload JSON (object keyed by collection).
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        filters: SharedFilters,
        /// Print the full snapshot as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Filter one collection and print the outcome as JSON.
    Filter {
        /// Path to the collection JSON (array or `{ "data": [...] }`).
        #[arg(short, long)]
        input: PathBuf,
        /// appointments, lab-orders, studies, expenses or payroll.
        #[arg(short, long)]
        kind: CollectionKind,
        #[command(flatten)]
        filters: SharedFilters,
        /// `all` or a status of the collection.
        #[arg(long, default_value = "all")]
        status: String,
        /// Restrict search to these fields (repeatable).
        #[arg(long = "field")]
        fields: Vec<String>,
        /// Exact category match, as FIELD=VALUE (e.g. modality=CBCT).
        #[arg(long)]
        category: Option<String>,
    },
    /// Search every collection of a dashboard payload and print matches as JSON.
    Search {
        /// Path to the payload JSON (object keyed by collection).
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        filters: SharedFilters,
    },
}

#[derive(Args, Debug)]
struct SharedFilters {
    /// overall, day, week, month or 1D, 3D, 1W, 1M, 1Y, ALL.
    #[arg(short, long)]
    window: Option<TimeWindow>,
    /// Case-insensitive search term.
    #[arg(short, long, default_value = "")]
    search: String,
    /// Oldest first instead of newest first.
    #[arg(long)]
    ascending: bool,
}

impl SharedFilters {
    fn sort(&self) -> SortOrder {
        if self.ascending {
            SortOrder::DateAsc
        } else {
            SortOrder::DateDesc
        }
    }

    fn dashboard(&self) -> DashboardFilters {
        DashboardFilters {
            time_window: self.window,
            search_term: self.search.clone(),
            sort: self.sort(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_json=info".parse()?)
                .add_directive("clinic_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let now = match &cli.now {
        Some(text) => parse_datetime(text)
            .with_context(|| format!("Could not read --now timestamp {text:?}"))?,
        None => Utc::now(),
    };

    match cli.command {
        Commands::Dashboard {
            input,
            filters,
            json,
        } => run_dashboard(&input, &filters, json, now, &config),
        Commands::Filter {
            input,
            kind,
            filters,
            status,
            fields,
            category,
        } => {
            let criteria = FilterCriteria {
                time_window: filters.window,
                status,
                search_term: filters.search.clone(),
                search_fields: fields,
                category: category.as_deref().map(parse_category).transpose()?,
                sort: filters.sort(),
            };
            run_filter(&input, kind, &criteria, now, &config)
        }
        Commands::Search { input, filters } => run_search(&input, &filters, now, &config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ClinicConfig> {
    let Some(path) = path else {
        return Ok(ClinicConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {path:?}"))?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("Invalid config file {path:?}"))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

fn parse_category(text: &str) -> anyhow::Result<CategoryFilter> {
    let (field, value) = text
        .split_once('=')
        .with_context(|| format!("Category must look like FIELD=VALUE, got {text:?}"))?;
    Ok(CategoryFilter {
        field: field.trim().to_string(),
        value: value.trim().to_string(),
    })
}

fn run_dashboard(
    input: &Path,
    filters: &SharedFilters,
    json: bool,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Could not read file {input:?}"))?;

    let snapshot = summarize_dashboard_str(&data, &filters.dashboard(), now, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Generated at: {}", snapshot.generated_at);
    println!(
        "Appointments: {} (completed {}, confirmed {}, pending {}, canceled {})",
        snapshot.appointments.stats.total,
        snapshot.appointments.stats.count("completed"),
        snapshot.appointments.stats.count("confirmed"),
        snapshot.appointments.stats.count("pending"),
        snapshot.appointments.stats.count("canceled"),
    );
    println!(
        "Lab orders: {} (in progress {}, completed {}, overdue {})",
        snapshot.lab_orders.stats.total,
        snapshot.lab_orders.stats.count("in_progress"),
        snapshot.lab_orders.stats.count("completed"),
        snapshot.overdue_lab_orders,
    );
    println!(
        "Studies: {} (pending {})",
        snapshot.studies.stats.total,
        snapshot.studies.stats.count("pending"),
    );
    if let Some(numeric) = &snapshot.expenses.stats.numeric {
        println!(
            "Expenses: {} totalling {:.2}",
            snapshot.expenses.stats.total, numeric.sum
        );
    }
    if let Some(numeric) = &snapshot.payroll.stats.numeric {
        println!(
            "Payroll: {} rows, net {:.2}, average per employee {:.2}",
            snapshot.payroll.stats.total, numeric.sum, numeric.average
        );
    }

    Ok(())
}

fn run_filter(
    input: &Path,
    kind: CollectionKind,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Could not read file {input:?}"))?;
    let records: serde_json::Value =
        serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {input:?}"))?;

    let outcome = filter_collection_value(kind, &records, criteria, now, config)?;
    info!(%kind, "filtered collection");
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn run_search(
    input: &Path,
    filters: &SharedFilters,
    now: DateTime<Utc>,
    config: &ClinicConfig,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Could not read file {input:?}"))?;
    let payload: serde_json::Value =
        serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {input:?}"))?;

    let found = search_payload_value(&payload, &filters.dashboard(), now, config)?;
    info!(matches = found.len(), "searched payload");
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
