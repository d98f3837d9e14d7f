use std::path::{Path, PathBuf};

use crate::api::RecordSource;
use crate::config::{resolve_output_dir, Config};
use crate::error::Result;
use crate::invoice::pending::PendingSet;
use crate::invoice::reconcile::{find_bill, reconcile, InvoiceData};
use crate::layout::{layout_invoice, Document, Style};
use crate::pdf::{generate_pdf, invoice_file_name, write_typst};
use crate::records::Bill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Compile with the typst CLI
    #[default]
    Pdf,
    /// Write the Typst source only
    Typst,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Typst => "typ",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// File path, or an existing directory to place the file in
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Result of a successful generation
#[derive(Debug)]
pub struct GeneratedInvoice {
    pub data: InvoiceData,
    pub pages: usize,
    pub path: PathBuf,
}

/// Fetch everything for `reference` and reconcile it into invoice data
pub fn prepare_invoice(
    source: &dyn RecordSource,
    reference: &str,
    config: &Config,
) -> Result<InvoiceData> {
    let bills = source.bills()?;
    let bill = find_bill(&bills, reference, &config.invoice.number_prefix)?;
    reconcile_bill(source, bill, config)
}

fn reconcile_bill(source: &dyn RecordSource, bill: &Bill, config: &Config) -> Result<InvoiceData> {
    tracing::debug!(bill = %bill.id, "bill selected");

    let residents = source.residents()?;
    let consumptions = source.consumptions()?;
    let houses = source.houses()?;

    reconcile(bill, &residents, &consumptions, &houses, config)
}

/// Reconcile and lay out the invoice for `reference` with the default style
pub fn layout_for(
    source: &dyn RecordSource,
    reference: &str,
    config: &Config,
) -> Result<Document> {
    let data = prepare_invoice(source, reference, config)?;
    Ok(layout_invoice(&data, &Style::default()))
}

fn output_path(
    options: &GenerateOptions,
    file_name: &str,
    config: &Config,
    cfg_dir: &Path,
) -> Result<PathBuf> {
    match &options.output {
        Some(path) if path.is_dir() => Ok(path.join(file_name)),
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(path.clone())
        }
        None => {
            let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
            std::fs::create_dir_all(&output_dir)?;
            Ok(output_dir.join(file_name))
        }
    }
}

/// Generate the invoice for one bill.
///
/// The bill is marked in flight by its id from the moment it is found until
/// the run ends. Nothing is written when the bill, its resident or its
/// consumption cannot be resolved.
pub fn generate_invoice(
    source: &dyn RecordSource,
    reference: &str,
    config: &Config,
    cfg_dir: &Path,
    pending: &PendingSet,
    options: &GenerateOptions,
) -> Result<GeneratedInvoice> {
    let bills = source.bills()?;
    let bill = find_bill(&bills, reference, &config.invoice.number_prefix)?;
    let _in_flight = pending.begin(&bill.id);

    let data = reconcile_bill(source, bill, config)?;
    let document = layout_invoice(&data, &Style::default());
    tracing::info!(number = %data.number, pages = document.pages.len(), "invoice laid out");

    let file_name = invoice_file_name(
        &config.invoice.file_prefix,
        &data.number,
        options.format.extension(),
    );
    let path = output_path(options, &file_name, config, cfg_dir)?;

    match options.format {
        OutputFormat::Pdf => generate_pdf(&document, &path)?,
        OutputFormat::Typst => write_typst(&document, &path)?,
    }
    tracing::info!(path = %path.display(), "invoice written");

    Ok(GeneratedInvoice {
        pages: document.pages.len(),
        data,
        path,
    })
}
