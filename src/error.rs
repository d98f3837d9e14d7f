use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactureError {
    #[error("Config directory not found at {0}. Run 'facture init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Snapshot file not found: {0}")]
    SnapshotFileNotFound(PathBuf),

    #[error("Bill '{0}' not found")]
    BillNotFound(String),

    #[error("No resident found for bill {0}. The invoice cannot be generated.")]
    ResidentNotFound(String),

    #[error("No consumption found for bill {0}. The invoice cannot be generated.")]
    ConsumptionNotFound(String),

    #[error("Invalid status filter '{0}'. Expected pending, paid or overdue.")]
    InvalidStatus(String),

    #[error("API request to {endpoint} failed: {message}")]
    Api { endpoint: String, message: String },

    #[error("Session expired or token rejected by {0}. Update the token in config.toml.")]
    Unauthorized(String),

    #[error("Failed to parse {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FactureError>;
