//! Normalized back-office records.
//!
//! The API has gone through a French and an English contract, and nests some
//! references as embedded objects in one version and as bare ids in the
//! other. Every variant is resolved here, once, so the rest of the crate only
//! sees the types below.

mod envelope;
mod fields;

pub use envelope::{parse_collection, Collection};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use fields::Fields;

const ID_KEYS: &[&str] = &["_id", "id"];
const RESIDENT_KEYS: &[&str] = &["residentId", "resident", "userId", "user"];
const HOUSE_KEYS: &[&str] = &["maisonId", "maison", "houseId", "house"];
const MONTH_KEYS: &[&str] = &["mois", "month"];
const YEAR_KEYS: &[&str] = &["annee", "year"];

#[derive(Error, Debug, PartialEq)]
#[error("invalid {kind} record: {reason}")]
pub struct InvalidRecord {
    pub kind: &'static str,
    pub reason: &'static str,
}

impl InvalidRecord {
    fn new(kind: &'static str, reason: &'static str) -> Self {
        Self { kind, reason }
    }
}

/// A reference to another record: either a bare id or an embedded (possibly partial) object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Link {
    pub id: Option<String>,
    pub name: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub resident_id: Option<String>,
}

impl Link {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self {
                id: Some(s.trim().to_string()),
                ..Self::default()
            }),
            Value::Number(n) => Some(Self {
                id: Some(n.to_string()),
                ..Self::default()
            }),
            Value::Object(_) => {
                let fields = Fields::new(value)?;
                Some(Self {
                    id: fields.string(ID_KEYS),
                    name: fields.string(&["nomMaison", "name", "nom"]),
                    month: fields.month(MONTH_KEYS),
                    year: fields.year(YEAR_KEYS),
                    resident_id: fields.link(RESIDENT_KEYS).and_then(|l| l.id),
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl BillStatus {
    /// Map any of the labels the backends use; unknown labels are treated as pending.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Label printed in the invoice badge
    pub fn badge(&self) -> &'static str {
        match self {
            BillStatus::Pending => "EN ATTENTE",
            BillStatus::Paid => "PAYÉE",
            BillStatus::Overdue => "EN RETARD",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Pending => "PENDING",
            BillStatus::Paid => "PAID",
            BillStatus::Overdue => "OVERDUE",
        };
        f.write_str(label)
    }
}

impl FromStr for BillStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .map(|c| match c {
                'é' | 'è' | 'ê' | 'É' | 'È' => 'e',
                other => other,
            })
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "payee" | "paye" | "paid" => Ok(BillStatus::Paid),
            "enretard" | "retard" | "overdue" | "late" => Ok(BillStatus::Overdue),
            "enattente" | "attente" | "pending" | "unpaid" | "impayee" => Ok(BillStatus::Pending),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    pub id: String,
    pub invoice_number: Option<String>,
    pub amount: f64,
    pub issued_on: Option<DateTime<Utc>>,
    pub paid_on: Option<DateTime<Utc>>,
    pub status: BillStatus,
    pub consumption: Option<Link>,
    pub resident: Option<Link>,
    pub house: Option<Link>,
    /// Billing period carried on the bill itself by some backends
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub price_per_kwh: Option<f64>,
    pub fixed_fee: Option<f64>,
}

impl TryFrom<&Value> for Bill {
    type Error = InvalidRecord;

    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        let fields = Fields::new(value).ok_or(InvalidRecord::new("bill", "not an object"))?;
        let id = fields
            .string(ID_KEYS)
            .ok_or(InvalidRecord::new("bill", "missing id"))?;
        let amount = fields
            .number(&["montantTotal", "montant", "amount", "totalAmount", "total"])
            .ok_or(InvalidRecord::new("bill", "missing amount"))?;

        let details = value.get("details").and_then(Fields::new);
        let detail = |keys: &[&str]| {
            details
                .as_ref()
                .and_then(|d| d.number(keys))
                .or_else(|| fields.number(keys))
        };

        Ok(Self {
            id,
            invoice_number: fields.string(&["numeroFacture", "invoiceNumber", "number"]),
            amount,
            issued_on: fields.date(&["dateEmission", "dateFacture", "issueDate", "createdAt"]),
            paid_on: fields.date(&["datePaiement", "paidAt", "paymentDate"]),
            status: fields
                .string(&["statut", "status"])
                .map(|s| BillStatus::from_label(&s))
                .unwrap_or_default(),
            consumption: fields.link(&[
                "consommationId",
                "consommation",
                "consumptionId",
                "consumption",
            ]),
            resident: fields.link(RESIDENT_KEYS),
            house: fields.link(HOUSE_KEYS),
            month: fields.month(MONTH_KEYS),
            year: fields.year(YEAR_KEYS),
            price_per_kwh: detail(&["prixKwh", "pricePerKwh", "tarifKwh"]),
            fixed_fee: detail(&["fraisFixes", "fixedFee", "fixedFees"]),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resident {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub house: Option<Link>,
}

impl Resident {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl TryFrom<&Value> for Resident {
    type Error = InvalidRecord;

    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        let fields = Fields::new(value).ok_or(InvalidRecord::new("resident", "not an object"))?;
        let id = fields
            .string(ID_KEYS)
            .ok_or(InvalidRecord::new("resident", "missing id"))?;

        Ok(Self {
            id,
            first_name: fields.string(&["prenom", "firstName"]).unwrap_or_default(),
            last_name: fields.string(&["nom", "lastName"]).unwrap_or_default(),
            email: fields.string(&["email"]).unwrap_or_default(),
            phone: fields.string(&["telephone", "phone"]),
            house: fields.link(HOUSE_KEYS),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Consumption {
    pub id: Option<String>,
    pub kwh: f64,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub previous_index: Option<f64>,
    pub current_index: Option<f64>,
    pub resident_id: Option<String>,
    pub house: Option<Link>,
}

impl TryFrom<&Value> for Consumption {
    type Error = InvalidRecord;

    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        let fields =
            Fields::new(value).ok_or(InvalidRecord::new("consumption", "not an object"))?;
        let kwh = fields
            .number(&["kwh", "releveCompteur", "consumption"])
            .ok_or(InvalidRecord::new("consumption", "missing kwh"))?;

        Ok(Self {
            id: fields.string(ID_KEYS),
            kwh,
            month: fields.month(MONTH_KEYS),
            year: fields.year(YEAR_KEYS),
            previous_index: fields.number(&["previousIndex", "ancienIndex"]),
            current_index: fields.number(&["currentIndex", "nouvelIndex"]),
            resident_id: fields.link(RESIDENT_KEYS).and_then(|l| l.id),
            house: fields.link(HOUSE_KEYS),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct House {
    pub id: String,
    pub name: String,
}

impl TryFrom<&Value> for House {
    type Error = InvalidRecord;

    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        let fields = Fields::new(value).ok_or(InvalidRecord::new("house", "not an object"))?;
        Ok(Self {
            id: fields
                .string(ID_KEYS)
                .ok_or(InvalidRecord::new("house", "missing id"))?,
            name: fields
                .string(&["nomMaison", "name", "nom"])
                .ok_or(InvalidRecord::new("house", "missing name"))?,
        })
    }
}
