use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    pub company: Company,
    pub invoice: InvoiceSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Page size requested from list endpoints; the adapter searches the
    /// full listing client-side.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_timeout() -> u64 {
    10
}

fn default_page_limit() -> u32 {
    1000
}

/// Branding printed in the header and footer bands
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    pub tagline: String,
    pub thanks: String,
    pub contact_note: String,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceSettings {
    pub currency_label: String,
    pub default_price_per_kwh: f64,
    pub number_prefix: String,
    pub file_prefix: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PdfSettings {
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: "https://ecopower-api.vercel.app".to_string(),
                token: None,
                timeout_secs: default_timeout(),
                page_limit: default_page_limit(),
            },
            company: Company {
                name: "ECOPOWER".to_string(),
                tagline: "Gestion de Consommation Électrique".to_string(),
                thanks: "Merci pour votre confiance !".to_string(),
                contact_note:
                    "Pour toute question concernant cette facture, n'hésitez pas à nous contacter."
                        .to_string(),
                copyright: Some("© 2024 Ecopower - Tous droits réservés".to_string()),
            },
            invoice: InvoiceSettings {
                currency_label: "FCFA".to_string(),
                default_price_per_kwh: 125.0,
                number_prefix: "FACT".to_string(),
                file_prefix: "Facture".to_string(),
                description: "Consommation électrique".to_string(),
            },
            pdf: PdfSettings {
                output_dir: "~/.facture/output".to_string(),
            },
        }
    }
}
