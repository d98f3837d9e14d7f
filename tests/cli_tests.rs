use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn facture_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("facture"))
}

/// Initialized config dir plus a snapshot dir with one invoiceable bill,
/// one paid bill and one bill whose consumption cannot be matched
fn setup() -> (TempDir, String, String) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");
    let snapshot = temp_dir.path().join("snapshot");
    fs::create_dir_all(&snapshot).unwrap();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    write_snapshot(&snapshot);

    (
        temp_dir,
        config_path.to_str().unwrap().to_string(),
        snapshot.to_str().unwrap().to_string(),
    )
}

fn write_snapshot(dir: &Path) {
    fs::write(
        dir.join("bills.json"),
        r#"{
          "factures": [
            {
              "_id": "65f1c2aa9d3e4b00abcdef12",
              "montant": 15000,
              "dateEmission": "2024-03-05T00:00:00Z",
              "statut": "en attente",
              "residentId": { "_id": "r1", "nom": "Traoré", "prenom": "Awa" },
              "maisonId": "h1",
              "consommationId": { "_id": "c1", "mois": 2, "annee": 2024 },
              "details": { "prixKwh": 125, "fraisFixes": 2000 }
            },
            {
              "_id": "65f1c2aa9d3e4b0012345678",
              "numeroFacture": "FACT-2024-0002",
              "montant": 8250,
              "dateEmission": "2024-02-04",
              "statut": "payée",
              "residentId": "r1",
              "maisonId": "h1",
              "consommationId": "c0"
            },
            {
              "_id": "65f1c2aa9d3e4b0099999999",
              "montant": 4000,
              "statut": "en retard",
              "residentId": "r1",
              "consommationId": { "_id": "missing", "mois": 11, "annee": 2023 }
            },
            { "montant": 1000 }
          ]
        }"#,
    )
    .unwrap();

    fs::write(
        dir.join("residents.json"),
        r#"{ "residents": [
            { "_id": "r1", "prenom": "Awa", "nom": "Traoré",
              "email": "awa@example.com", "telephone": "+221 77 000 00 00",
              "maisonId": "h1" }
        ] }"#,
    )
    .unwrap();

    fs::write(
        dir.join("consumptions.json"),
        r#"{ "consommations": [
            { "_id": "c0", "kwh": 50, "mois": 1, "annee": 2024,
              "ancienIndex": 950, "nouvelIndex": 1000, "residentId": "r1" },
            { "_id": "c1", "kwh": 104, "mois": 2, "annee": 2024,
              "ancienIndex": 1000, "nouvelIndex": 1104, "residentId": "r1" }
        ] }"#,
    )
    .unwrap();

    fs::write(
        dir.join("houses.json"),
        r#"{ "houses": [ { "_id": "h1", "nomMaison": "Villa Palmier" } ] }"#,
    )
    .unwrap();
}

#[test]
fn test_help() {
    facture_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Electricity invoice generator for the consumption back-office",
        ));
}

#[test]
fn test_version() {
    facture_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("facture"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized facture config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("facture-config");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    facture_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_shows_source() {
    let (_temp, config, snapshot) = setup();

    facture_cmd()
        .args(["-C", &config, "--snapshot", &snapshot, "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Facture Status"))
        .stdout(predicate::str::contains("snapshot"))
        .stdout(predicate::str::contains("Token:            not set"));
}

#[test]
fn test_bills_list() {
    let (_temp, config, snapshot) = setup();

    facture_cmd()
        .args(["-C", &config, "--snapshot", &snapshot, "bills"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FACT-ABCDEF12"))
        .stdout(predicate::str::contains("FACT-2024-0002"))
        .stdout(predicate::str::contains("05/03/2024"))
        .stdout(predicate::str::contains("Villa Palmier"))
        .stdout(predicate::str::contains("15 000 FCFA"))
        .stdout(predicate::str::contains("Total: 3 bills"));
}

#[test]
fn test_bills_filter_by_status() {
    let (_temp, config, snapshot) = setup();

    facture_cmd()
        .args(["-C", &config, "--snapshot", &snapshot, "bills", "--status", "paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FACT-2024-0002"))
        .stdout(predicate::str::contains("PAYÉE"))
        .stdout(predicate::str::contains("FACT-ABCDEF12").not())
        .stdout(predicate::str::contains("Total: 1 bills"));
}

#[test]
fn test_bills_invalid_status() {
    let (_temp, config, snapshot) = setup();

    facture_cmd()
        .args(["-C", &config, "--snapshot", &snapshot, "bills", "--status", "cancelled"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status filter 'cancelled'"));
}

#[test]
fn test_generate_typst() {
    let (temp, config, snapshot) = setup();
    let out_dir = temp.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();

    facture_cmd()
        .args([
            "-C",
            &config,
            "--snapshot",
            &snapshot,
            "generate",
            "65f1c2aa9d3e4b00abcdef12",
            "--typst",
            "-o",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated FACT-ABCDEF12"))
        .stdout(predicate::str::contains("Awa Traoré"))
        .stdout(predicate::str::contains("15 000 FCFA"));

    let file = out_dir.join("Facture_FACT-ABCDEF12.typ");
    assert!(file.exists());
    let source = fs::read_to_string(file).unwrap();
    assert!(source.contains("\"13 000 FCFA\""));
    assert!(source.contains("\"Villa Palmier\""));
    assert!(source.contains("\"104.00\""));
}

#[test]
fn test_generate_by_invoice_number_uses_output_dir() {
    let (_temp, config, snapshot) = setup();

    facture_cmd()
        .args([
            "-C",
            &config,
            "--snapshot",
            &snapshot,
            "generate",
            "fact-2024-0002",
            "--typst",
        ])
        .assert()
        .success();

    assert!(Path::new(&config)
        .join("output")
        .join("Facture_FACT-2024-0002.typ")
        .exists());
}

#[test]
fn test_generate_unmatched_consumption() {
    let (temp, config, snapshot) = setup();
    let out_dir = temp.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();

    facture_cmd()
        .args([
            "-C",
            &config,
            "--snapshot",
            &snapshot,
            "generate",
            "65f1c2aa9d3e4b0099999999",
            "--typst",
            "-o",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No consumption found"));

    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
}

#[test]
fn test_generate_missing_bill() {
    let (_temp, config, snapshot) = setup();

    facture_cmd()
        .args(["-C", &config, "--snapshot", &snapshot, "generate", "nope", "--typst"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bill 'nope' not found"));
}

#[test]
fn test_missing_snapshot_file() {
    let (temp, config, _snapshot) = setup();
    let empty = temp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    facture_cmd()
        .args(["-C", &config, "--snapshot", empty.to_str().unwrap(), "bills"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Snapshot file not found"));
}

#[test]
fn test_layout_json() {
    let (_temp, config, snapshot) = setup();

    let output = facture_cmd()
        .args(["-C", &config, "--snapshot", &snapshot, "layout", "FACT-ABCDEF12"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pages = doc["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 1);
    let kinds: Vec<&str> = pages[0]["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        ["header", "metadata", "recipient", "table", "summary", "footer"]
    );
}
