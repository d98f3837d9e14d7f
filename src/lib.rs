pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod invoice;
pub mod layout;
pub mod pdf;
pub mod records;

pub use config::{Company, Config};
pub use error::{FactureError, Result};
pub use invoice::{generate_invoice, InvoiceData};
