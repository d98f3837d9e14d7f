use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{Company, Config};
use crate::error::{FactureError, Result};
use crate::records::{Bill, BillStatus, Consumption, House, Link, Resident};

/// Everything the layout engine needs for one invoice, already reconciled
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceData {
    pub bill_id: String,
    pub number: String,
    pub issued_on: Option<DateTime<Utc>>,
    pub status: BillStatus,
    pub resident_name: String,
    pub phone: String,
    pub email: String,
    pub house_name: String,
    /// Table description, with the billing period when known
    pub description: String,
    /// Summary line label
    pub line_label: String,
    pub kwh: f64,
    pub previous_index: f64,
    pub current_index: f64,
    pub price_per_kwh: f64,
    pub fixed_fee: f64,
    /// Table amount: `kwh * price_per_kwh`
    pub line_amount: f64,
    /// Summary amount: `total - fixed_fee`; the total is authoritative
    pub consumption_amount: f64,
    pub total: f64,
    pub currency_label: String,
    pub company: Company,
}

/// The bill's own number, or `<prefix>-<last 8 id chars, upper-cased>`
pub fn invoice_number(bill: &Bill, prefix: &str) -> String {
    match &bill.invoice_number {
        Some(number) => number.clone(),
        None => {
            let chars: Vec<char> = bill.id.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
            format!("{}-{}", prefix, tail.to_uppercase())
        }
    }
}

/// Find a bill by id, invoice number (case-insensitive) or derived fallback number
pub fn find_bill<'a>(bills: &'a [Bill], reference: &str, prefix: &str) -> Result<&'a Bill> {
    let reference = reference.trim();
    bills
        .iter()
        .find(|b| b.id == reference)
        .or_else(|| {
            bills.iter().find(|b| {
                b.invoice_number
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(reference))
            })
        })
        .or_else(|| {
            bills
                .iter()
                .find(|b| invoice_number(b, prefix).eq_ignore_ascii_case(reference))
        })
        .ok_or_else(|| FactureError::BillNotFound(reference.to_string()))
}

fn link_id(link: Option<&Link>) -> Option<&str> {
    link.and_then(|l| l.id.as_deref())
}

/// Billing period: from the embedded consumption, else from the bill itself
fn billing_period(bill: &Bill) -> Option<(u32, i32)> {
    let embedded = bill.consumption.as_ref();
    let month = embedded.and_then(|c| c.month).or(bill.month)?;
    let year = embedded.and_then(|c| c.year).or(bill.year)?;
    Some((month, year))
}

fn consumption_by_id<'a>(bill: &Bill, consumptions: &'a [Consumption]) -> Option<&'a Consumption> {
    let id = link_id(bill.consumption.as_ref())?;
    consumptions.iter().find(|c| c.id.as_deref() == Some(id))
}

fn consumption_by_period<'a>(
    bill: &Bill,
    resident_id: &str,
    consumptions: &'a [Consumption],
) -> Option<&'a Consumption> {
    let (month, year) = billing_period(bill)?;
    consumptions.iter().find(|c| {
        c.month == Some(month) && c.year == Some(year) && c.resident_id.as_deref() == Some(resident_id)
    })
}

/// House name: bill, then consumption, then resident; embedded names first, then id lookup
fn house_name(
    bill: &Bill,
    consumption: &Consumption,
    resident: &Resident,
    houses: &[House],
) -> String {
    let links = [
        bill.house.as_ref(),
        consumption.house.as_ref(),
        resident.house.as_ref(),
    ];
    let links = links.iter().flatten();

    links
        .clone()
        .find_map(|link| link.name.clone())
        .or_else(|| {
            links.filter_map(|link| link.id.as_deref()).find_map(|id| {
                houses
                    .iter()
                    .find(|h| h.id == id)
                    .map(|h| h.name.clone())
            })
        })
        .unwrap_or_else(|| "N/A".to_string())
}

fn month_label(month: u32, year: i32) -> String {
    format!("{:02}/{}", month, year)
}

/// Match a bill with its resident, consumption and house from full listings.
///
/// Fails before anything is rendered when the resident or the consumption
/// cannot be found.
pub fn reconcile(
    bill: &Bill,
    residents: &[Resident],
    consumptions: &[Consumption],
    houses: &[House],
    config: &Config,
) -> Result<InvoiceData> {
    let by_id = consumption_by_id(bill, consumptions);

    let resident_id = link_id(bill.resident.as_ref())
        .or_else(|| bill.consumption.as_ref().and_then(|c| c.resident_id.as_deref()))
        .or_else(|| by_id.and_then(|c| c.resident_id.as_deref()));
    let resident = resident_id
        .and_then(|id| residents.iter().find(|r| r.id == id))
        .ok_or_else(|| FactureError::ResidentNotFound(bill.id.clone()))?;

    let consumption = by_id
        .or_else(|| consumption_by_period(bill, &resident.id, consumptions))
        .ok_or_else(|| FactureError::ConsumptionNotFound(bill.id.clone()))?;

    tracing::debug!(
        bill = %bill.id,
        resident = %resident.id,
        consumption = ?consumption.id,
        matched_by_id = by_id.is_some(),
        "reconciled bill"
    );

    let settings = &config.invoice;
    let price_per_kwh = bill
        .price_per_kwh
        .filter(|p| *p > 0.0)
        .unwrap_or(settings.default_price_per_kwh);
    let fixed_fee = bill.fixed_fee.unwrap_or(0.0);
    let previous_index = consumption.previous_index.unwrap_or(0.0);
    let current_index = consumption
        .current_index
        .filter(|c| *c != 0.0)
        .unwrap_or(previous_index + consumption.kwh);

    let period = match (consumption.month, consumption.year) {
        (Some(m), Some(y)) => Some((m, y)),
        _ => billing_period(bill),
    };
    let description = match period {
        Some((m, y)) => format!("{} ({})", settings.description, month_label(m, y)),
        None => settings.description.clone(),
    };

    Ok(InvoiceData {
        bill_id: bill.id.clone(),
        number: invoice_number(bill, &settings.number_prefix),
        issued_on: bill.issued_on,
        status: bill.status,
        resident_name: resident.full_name(),
        phone: resident.phone.clone().unwrap_or_else(|| "N/A".to_string()),
        email: resident.email.clone(),
        house_name: house_name(bill, consumption, resident, houses),
        description,
        line_label: settings.description.clone(),
        kwh: consumption.kwh,
        previous_index,
        current_index,
        price_per_kwh,
        fixed_fee,
        line_amount: consumption.kwh * price_per_kwh,
        consumption_amount: bill.amount - fixed_fee,
        total: bill.amount,
        currency_label: settings.currency_label.clone(),
        company: config.company.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{parse_collection, Collection};
    use serde_json::{json, Value};

    fn bill(value: Value) -> Bill {
        Bill::try_from(&value).unwrap()
    }

    fn residents() -> Vec<Resident> {
        parse_collection(
            &json!({ "residents": [
                { "_id": "r1", "prenom": "Awa", "nom": "Traoré", "email": "awa@example.com",
                  "telephone": "+225 07 00 00 01", "maison": { "_id": "h1", "nomMaison": "Résidence Palmier" } },
                { "_id": "r2", "prenom": "Yao", "nom": "Kouassi", "email": "yao@example.com" }
            ]}),
            Collection::Residents,
        )
    }

    fn consumptions() -> Vec<Consumption> {
        parse_collection(
            &json!({ "consommations": [
                { "_id": "c1", "kwh": 104, "mois": 2, "annee": 2024, "residentId": "r1",
                  "previousIndex": 1000, "currentIndex": 1104 },
                { "_id": "c2", "kwh": 80, "mois": 3, "annee": 2024, "residentId": "r2" }
            ]}),
            Collection::Consumptions,
        )
    }

    fn houses() -> Vec<House> {
        parse_collection(
            &json!([{ "_id": "h2", "nomMaison": "Villa Azur" }]),
            Collection::Houses,
        )
    }

    #[test]
    fn fallback_number_uses_id_tail() {
        let b = bill(json!({ "_id": "65f1c2aa9d3e4b00abcdef12", "montant": 1 }));
        assert_eq!(invoice_number(&b, "FACT"), "FACT-ABCDEF12");

        let short = bill(json!({ "_id": "ab12", "montant": 1 }));
        assert_eq!(invoice_number(&short, "FACT"), "FACT-AB12");
    }

    #[test]
    fn bills_are_found_by_id_number_or_fallback() {
        let bills = vec![
            bill(json!({ "_id": "65f1c2aa9d3e4b00abcdef12", "montant": 1 })),
            bill(json!({ "_id": "b2", "numeroFacture": "FAC-2024-0007", "montant": 2 })),
        ];
        assert_eq!(find_bill(&bills, "b2", "FACT").unwrap().amount, 2.0);
        assert_eq!(find_bill(&bills, "fac-2024-0007", "FACT").unwrap().id, "b2");
        assert_eq!(find_bill(&bills, "FACT-ABCDEF12", "FACT").unwrap().amount, 1.0);
        assert!(matches!(
            find_bill(&bills, "nope", "FACT"),
            Err(FactureError::BillNotFound(_))
        ));
    }

    #[test]
    fn summary_is_decomposed_from_total() {
        let b = bill(json!({
            "_id": "b1", "montant": 15000, "residentId": "r1",
            "consommationId": { "_id": "c1", "kwh": 104, "mois": 2, "annee": 2024 },
            "details": { "fraisFixes": 2000 }
        }));
        let data = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default()).unwrap();
        assert_eq!(data.consumption_amount, 13000.0);
        assert_eq!(data.consumption_amount + data.fixed_fee, data.total);
        assert_eq!(data.price_per_kwh, 125.0);
        assert_eq!(data.resident_name, "Awa Traoré");
        assert_eq!(data.house_name, "Résidence Palmier");
        assert_eq!(data.description, "Consommation électrique (02/2024)");
    }

    #[test]
    fn indices_are_not_cross_checked() {
        let mut listing = consumptions();
        listing[0].previous_index = Some(10.0);
        listing[0].current_index = Some(20.0);
        let b = bill(json!({ "_id": "b1", "montant": 5000, "residentId": "r1", "consommationId": "c1" }));
        let data = reconcile(&b, &residents(), &listing, &houses(), &Config::default()).unwrap();
        assert_eq!(data.kwh, 104.0);
        assert_eq!(data.previous_index, 10.0);
        assert_eq!(data.current_index, 20.0);
    }

    #[test]
    fn missing_indices_default_from_kwh() {
        let b = bill(json!({ "_id": "b2", "montant": 10000, "consommationId": "c2" }));
        let data = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default()).unwrap();
        assert_eq!(data.previous_index, 0.0);
        assert_eq!(data.current_index, 80.0);
        assert_eq!(data.phone, "N/A");
        assert_eq!(data.fixed_fee, 0.0);
        assert_eq!(data.house_name, "N/A");
    }

    #[test]
    fn consumption_falls_back_to_period_and_resident() {
        let b = bill(json!({
            "_id": "b3", "montant": 9000, "residentId": { "_id": "r2" },
            "consommationId": { "_id": "stale", "mois": 3, "annee": 2024 },
            "maisonId": "h2"
        }));
        let data = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default()).unwrap();
        assert_eq!(data.kwh, 80.0);
        assert_eq!(data.house_name, "Villa Azur");
    }

    #[test]
    fn unmatched_consumption_aborts() {
        let b = bill(json!({
            "_id": "b4", "montant": 9000, "residentId": "r1",
            "consommationId": { "_id": "stale", "mois": 7, "annee": 2023 }
        }));
        let err = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default())
            .unwrap_err();
        assert!(matches!(err, FactureError::ConsumptionNotFound(id) if id == "b4"));
    }

    #[test]
    fn unmatched_resident_aborts() {
        let b = bill(json!({ "_id": "b5", "montant": 9000, "residentId": "ghost", "consommationId": "c1" }));
        let err = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default())
            .unwrap_err();
        assert!(matches!(err, FactureError::ResidentNotFound(_)));
    }

    #[test]
    fn price_from_bill_details_wins() {
        let b = bill(json!({
            "_id": "b6", "montant": 12000, "residentId": "r1", "consommationId": "c1",
            "details": { "prixKwh": 110.5 }
        }));
        let data = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default()).unwrap();
        assert_eq!(data.price_per_kwh, 110.5);
    }

    #[test]
    fn line_amount_is_priced_from_kwh() {
        let b = bill(json!({
            "_id": "b7", "montant": 15000, "residentId": "r2", "consommationId": "c2",
            "details": { "prixKwh": 125, "fraisFixes": 2000 }
        }));
        let data = reconcile(&b, &residents(), &consumptions(), &houses(), &Config::default()).unwrap();
        assert_eq!(data.line_amount, 10000.0);
        assert_eq!(data.consumption_amount, 13000.0);
    }
}
