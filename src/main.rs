use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use surveillance_dashboard::dashboard::{Dashboard, ViewOptions};
use surveillance_dashboard::{loader, mutations, report, temporal, variants};

#[derive(Parser)]
#[command(name = "surveillance-dashboard")]
#[command(about = "Descriptive views over a SARS-CoV-2 genomic surveillance CSV", long_about = None)]
struct Cli {
    /// Surveillance CSV; falls back to SURVEILLANCE_CSV
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ViewArgs {
    /// Lineages shown in the variant views
    #[arg(long, default_value_t = variants::DEFAULT_VARIANT_LIMIT)]
    limit: usize,
    /// Lineages given their own column in the monthly share view
    #[arg(long, default_value_t = temporal::DEFAULT_SHARE_LINEAGES)]
    top: usize,
    /// Protein prefix for the protein-scoped mutation view
    #[arg(long, default_value = mutations::SPIKE_PROTEIN)]
    protein: String,
}

impl From<ViewArgs> for ViewOptions {
    fn from(args: ViewArgs) -> Self {
        ViewOptions {
            variant_limit: args.limit,
            share_lineages: args.top,
            protein: args.protein,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sample, lineage and country totals
    Summary,
    /// Most frequent lineages with detection windows
    Variants {
        #[arg(long, default_value_t = variants::DEFAULT_VARIANT_LIMIT)]
        limit: usize,
    },
    /// Monthly counts, growth and lineage shares
    Temporal {
        #[arg(long, default_value_t = temporal::DEFAULT_SHARE_LINEAGES)]
        top: usize,
    },
    /// Gender and age breakdowns
    Demographics,
    /// Mutation frequency, protein views and co-occurrence
    Mutations {
        #[arg(long, default_value = mutations::SPIKE_PROTEIN)]
        protein: String,
    },
    /// Write every tab as a markdown report
    Report {
        #[command(flatten)]
        views: ViewArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write every view as JSON for a charting front end
    Export {
        #[command(flatten)]
        views: ViewArgs,
        #[arg(long, default_value = "dashboard.json")]
        out: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_json = std::env::var("DASHBOARD_LOG_JSON")
        .map(|value| matches!(value.as_str(), "1" | "true"))
        .unwrap_or(false);
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let csv_path = match cli.csv {
        Some(path) => path,
        None => std::env::var("SURVEILLANCE_CSV")
            .map(PathBuf::from)
            .context("pass --csv or set SURVEILLANCE_CSV to the surveillance CSV")?,
    };

    let records = loader::load(&csv_path)
        .await
        .with_context(|| format!("could not open dashboard for {}", csv_path.display()))?;
    let dashboard = Dashboard::new(records);

    let mut output = String::new();
    match cli.command {
        Commands::Summary => report::write_overview(&mut output, &dashboard),
        Commands::Variants { limit } => report::write_variants(&mut output, &dashboard, limit),
        Commands::Temporal { top } => report::write_temporal(&mut output, &dashboard, top),
        Commands::Demographics => report::write_demographics(&mut output, &dashboard),
        Commands::Mutations { protein } => {
            report::write_mutations(&mut output, &dashboard, &protein)
        }
        Commands::Report { views, out } => {
            let markdown = report::build_report(
                &csv_path.display().to_string(),
                Utc::now().date_naive(),
                &dashboard,
                &views.into(),
            );
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
            return Ok(());
        }
        Commands::Export { views, out } => {
            let snapshot = dashboard.snapshot(&views.into());
            let json = serde_json::to_string_pretty(&snapshot)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Exported {} samples to {}.",
                dashboard.records().len(),
                out.display()
            );
            return Ok(());
        }
    }

    print!("{output}");
    Ok(())
}
