mod typst;

pub use typst::{generate_pdf, invoice_file_name, render_typst, write_typst};
