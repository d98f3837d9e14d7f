use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use facture::api::{ApiClient, RecordSource, SnapshotSource};
use facture::config::{config_dir, load_config, resolve_output_dir, CONFIG_TEMPLATE};
use facture::error::{FactureError, Result};
use facture::format::{format_amount, format_date};
use facture::invoice::{
    generate_invoice, invoice_number, layout_for, GenerateOptions, OutputFormat, PendingSet,
};
use facture::records::{Bill, BillStatus, House};
use facture::Config;

#[derive(Parser)]
#[command(name = "facture")]
#[command(version, about = "Electricity invoice generator for the consumption back-office", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.facture)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Read listings from exported JSON files in this directory instead of the API
    #[arg(long, global = true, value_name = "DIR")]
    snapshot: Option<PathBuf>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// List bills
    Bills {
        /// Only show bills with this status (pending, paid, overdue)
        #[arg(short, long)]
        status: Option<String>,

        /// Number of bills to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Generate the invoice for a bill
    Generate {
        /// Bill id or invoice number (e.g. FACT-ABCDEF12)
        bill: String,

        /// Output file or directory (default: output_dir/Facture_<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the Typst source instead of compiling a PDF
        #[arg(long)]
        typst: bool,

        /// Open generated file with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Print the laid-out invoice pages as JSON
    Layout {
        /// Bill id or invoice number
        bill: String,
    },

    /// Show configuration and record source
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    let snapshot = cli.snapshot;

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Bills { status, limit } => cmd_bills(&cfg_dir, snapshot, status, limit),
        Commands::Generate {
            bill,
            output,
            typst,
            open,
        } => cmd_generate(&cfg_dir, snapshot, &bill, output, typst, open),
        Commands::Layout { bill } => cmd_layout(&cfg_dir, snapshot, &bill),
        Commands::Status => cmd_status(&cfg_dir, snapshot),
    }
}

fn load(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(FactureError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    load_config(cfg_dir)
}

/// The snapshot directory when given, the configured API otherwise
fn record_source(config: &Config, snapshot: Option<PathBuf>) -> Box<dyn RecordSource> {
    match snapshot {
        Some(dir) => Box::new(SnapshotSource::new(dir)),
        None => Box::new(ApiClient::new(&config.api)),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(FactureError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized facture config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set the API URL and token:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. List bills:                 facture bills");
    println!();
    println!("Then generate an invoice:");
    println!("  facture generate <bill-id-or-number>");

    Ok(())
}

#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "HOUSE")]
    house: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn bill_house(bill: &Bill, houses: &[House]) -> String {
    let Some(link) = &bill.house else {
        return "-".to_string();
    };
    link.name
        .clone()
        .or_else(|| {
            let id = link.id.as_deref()?;
            houses.iter().find(|h| h.id == id).map(|h| h.name.clone())
        })
        .unwrap_or_else(|| "-".to_string())
}

/// List bills from the record source
fn cmd_bills(
    cfg_dir: &Path,
    snapshot: Option<PathBuf>,
    status: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let config = load(cfg_dir)?;
    let filter = match status {
        Some(s) => Some(
            s.parse::<BillStatus>()
                .map_err(|_| FactureError::InvalidStatus(s.clone()))?,
        ),
        None => None,
    };

    let source = record_source(&config, snapshot);
    let bills = source.bills()?;
    let houses = source.houses()?;

    let matching: Vec<&Bill> = bills
        .iter()
        .filter(|b| filter.map_or(true, |f| b.status == f))
        .collect();

    if matching.is_empty() {
        println!("No bills found.");
        return Ok(());
    }

    let shown = match limit {
        Some(n) => &matching[..n.min(matching.len())],
        None => &matching[..],
    };

    let currency = &config.invoice.currency_label;
    let rows: Vec<BillRow> = shown
        .iter()
        .map(|bill| BillRow {
            number: invoice_number(bill, &config.invoice.number_prefix),
            date: bill
                .issued_on
                .as_ref()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string()),
            house: bill_house(bill, &houses),
            amount: format!("{} {}", format_amount(bill.amount), currency),
            status: bill.status.badge().to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} bills", matching.len());

    Ok(())
}

/// Generate a new invoice
fn cmd_generate(
    cfg_dir: &Path,
    snapshot: Option<PathBuf>,
    bill: &str,
    output: Option<PathBuf>,
    typst: bool,
    open: bool,
) -> Result<()> {
    let config = load(cfg_dir)?;
    let source = record_source(&config, snapshot);
    let pending = PendingSet::new();
    let options = GenerateOptions {
        output,
        format: if typst {
            OutputFormat::Typst
        } else {
            OutputFormat::Pdf
        },
    };

    let generated = generate_invoice(source.as_ref(), bill, &config, cfg_dir, &pending, &options)?;
    let data = &generated.data;

    println!("Generated {}", data.number);
    println!("  Resident: {}", data.resident_name);
    println!(
        "  Total:    {} {}",
        format_amount(data.total),
        data.currency_label
    );
    println!("  Pages:    {}", generated.pages);
    println!("  Saved:    {}", generated.path.display());

    if open {
        open_path(&generated.path)?;
    }

    Ok(())
}

/// Print the scene graph for a bill
fn cmd_layout(cfg_dir: &Path, snapshot: Option<PathBuf>, bill: &str) -> Result<()> {
    let config = load(cfg_dir)?;
    let source = record_source(&config, snapshot);
    let document = layout_for(source.as_ref(), bill, &config)?;

    let json = serde_json::to_string_pretty(&document).map_err(|e| FactureError::Json {
        what: "layout".to_string(),
        source: e,
    })?;
    println!("{json}");

    Ok(())
}

fn cmd_status(cfg_dir: &Path, snapshot: Option<PathBuf>) -> Result<()> {
    let config = load(cfg_dir)?;
    let source = record_source(&config, snapshot);
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);

    println!("Facture Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("API:              {}", config.api.base_url);
    println!(
        "Token:            {}",
        if config.api.token.is_some() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("Source:           {}", source.describe());
    println!("Output directory: {}", output_dir.display());

    Ok(())
}

fn open_path(path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .spawn()?;
    }
    Ok(())
}
