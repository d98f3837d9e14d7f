mod generator;
mod pending;
mod reconcile;

pub use generator::{
    generate_invoice, layout_for, prepare_invoice, GenerateOptions, GeneratedInvoice,
    OutputFormat,
};
pub use pending::{PendingGuard, PendingSet};
pub use reconcile::{find_bill, invoice_number, reconcile, InvoiceData};
