mod settings;

pub use settings::{ApiSettings, Company, Config, InvoiceSettings, PdfSettings};

use crate::error::{FactureError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.facture/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "facture") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".facture"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output dir; relative paths are taken from the config dir
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(FactureError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| FactureError::ConfigParse { path, source: e })
}

fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "https://ecopower-api.vercel.app"
# token = "eyJhbGciOi..."   # admin access token, sent as a bearer token
timeout_secs = 10
page_limit = 1000

[company]
name = "ECOPOWER"
tagline = "Gestion de Consommation Électrique"
thanks = "Merci pour votre confiance !"
contact_note = "Pour toute question concernant cette facture, n'hésitez pas à nous contacter."
copyright = "© 2024 Ecopower - Tous droits réservés"

[invoice]
currency_label = "FCFA"
default_price_per_kwh = 125.0   # used when a bill carries no price
number_prefix = "FACT"          # fallback numbers look like FACT-ABCDEF12
file_prefix = "Facture"         # files are saved as Facture_<number>.pdf
description = "Consommation électrique"

[pdf]
output_dir = "output"   # relative to this directory, or absolute, or ~/...
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_with_defaults() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.token, None);
        assert_eq!(config.invoice.default_price_per_kwh, 125.0);
        assert_eq!(config.invoice.file_prefix, "Facture");
        assert_eq!(config.company.name, Config::default().company.name);
    }

    #[test]
    fn relative_output_dir_resolves_against_config_dir() {
        let dir = resolve_output_dir("output", Path::new("/tmp/facture"));
        assert_eq!(dir, PathBuf::from("/tmp/facture/output"));

        let abs = resolve_output_dir("/var/invoices", Path::new("/tmp/facture"));
        assert_eq!(abs, PathBuf::from("/var/invoices"));
    }
}
