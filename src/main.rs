mod db;
mod fetch;
mod parser;
mod report;
mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "faculty_scraper", about = "Faculty listing scraper: HTML pages → SQLite + text summary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every listing page, store its records and write the summary file
    Run {
        /// Listing page URL (repeatable; replaces the configured list)
        #[arg(short, long = "url")]
        urls: Vec<String>,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Summary text file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract records from a saved HTML page (no network, no database)
    Extract {
        /// HTML file to read
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show stored record counts
    Stats {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Stored records table
    Overview {
        #[arg(long)]
        db: Option<PathBuf>,
        /// Filter by title (e.g. "副教授")
        #[arg(short, long)]
        title: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { urls, db: db_path, output } => {
            let settings = Settings::load()?.apply(Overrides {
                urls,
                db_path,
                output_path: output,
            })?;
            let total = run_pages(&settings).await?;
            println!(
                "Extracted {} faculty records → {} and {}",
                total,
                settings.output_path.display(),
                settings.db_path.display()
            );
            Ok(())
        }
        Commands::Extract { file, format } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records = parser::process_page(&html);
            match format {
                Format::Text => {
                    for r in &records {
                        print!("{}", report::format_line(r));
                    }
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&records)?),
            }
            Ok(())
        }
        Commands::Stats { db: db_path } => {
            let settings = Settings::load()?.apply(Overrides {
                db_path,
                ..Default::default()
            })?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Total:     {}", s.total);
            for (title, n) in &s.by_title {
                println!("  {:<12} {:>4}", title, n);
            }
            Ok(())
        }
        Commands::Overview { db: db_path, title, limit } => {
            let settings = Settings::load()?.apply(Overrides {
                db_path,
                ..Default::default()
            })?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, title.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No records found.");
                return Ok(());
            }

            println!("{:>4} | {:<10} | {:<12} | {:<40}", "#", "Title", "Name", "Research");
            println!("{}", "-".repeat(76));
            for r in &rows {
                println!(
                    "{:>4} | {:<10} | {:<12} | {:<40}",
                    r.id,
                    truncate(&r.title, 10),
                    truncate(&r.name, 12),
                    truncate(&r.research, 40)
                );
            }
            println!("\n{} records", rows.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Fetch → extract → store each page in order, then write the summary.
/// Any failure aborts the run; pages committed before it stay in the table.
async fn run_pages(settings: &Settings) -> anyhow::Result<usize> {
    use indicatif::{ProgressBar, ProgressStyle};

    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;
    let client = fetch::build_client(Duration::from_secs(settings.timeout_secs))
        .context("Failed to build HTTP client")?;

    let pb = ProgressBar::new(settings.urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")?
            .progress_chars("=> "),
    );

    let mut all = Vec::new();
    for url in &settings.urls {
        let html = fetch::fetch_page(&client, url).await?;
        let records = parser::process_page(&html);
        let saved = db::insert_records(&conn, &records)?;
        info!(url = %url, records = saved, "page stored");
        all.extend(records);
        pb.inc(1);
    }
    pb.finish_and_clear();

    report::write_summary(&settings.output_path, &all)?;
    info!(total = all.len(), path = %settings.output_path.display(), "summary written");
    Ok(all.len())
}

/// Cut to `width` chars, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    match s.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

fn format_duration(d: Duration) -> String {
    let (h, m, s) = (d.as_secs() / 3600, d.as_secs() / 60 % 60, d.as_secs() % 60);
    match (h, m) {
        (0, 0) => format!("{:.1}s", d.as_secs_f64()),
        (0, _) => format!("{m}m {s}s"),
        _ => format!("{h}h {m}m {s}s"),
    }
}
