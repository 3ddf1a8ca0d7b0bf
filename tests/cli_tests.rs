use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn dunning_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dunning"))
}

fn init_config(config_path: &std::path::Path) {
    dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

fn write_invoices(config_path: &std::path::Path, content: &str) {
    fs::write(config_path.join("invoices.toml"), content).unwrap();
}

fn write_actions(config_path: &std::path::Path, content: &str) {
    fs::write(config_path.join("actions.toml"), content).unwrap();
}

/// Client 00542 owes under two companies; 00700 under one. AA-typed,
/// wrong-collective and settled rows must never count.
const LEDGER_FIXTURE: &str = r#"
[[invoices]]
type = "FAC"
entry = "SE0025001972"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00542"
due_date = "2026-01-15"
payment_method = "TRF"
sign = 1
amount = 100.0
paid = 0.0
reclamation_level = 2
pending = true

[[invoices]]
type = "FAC"
entry = "SE0025002001"
company = "S001"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00542"
due_date = "2026-03-01"
payment_method = "TRF"
sign = 1
amount = 50.0
paid = 0.0
pending = true

[[invoices]]
type = "FAC"
entry = "SE0025002044"
company = "S005"
plant = "P02"
currency = "EUR"
collective = "4300"
client = "00700"
due_date = "2026-02-10"
payment_method = "TRF"
sign = 1
amount = 30.0
paid = 0.0
reclamation_level = 3
pending = true

[[invoices]]
type = "AA"
entry = "SE0025009999"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00800"
due_date = "2026-02-01"
payment_method = "TRF"
sign = 1
amount = 999.0
pending = true

[[invoices]]
type = "FAC"
entry = "SE0025009998"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4302"
client = "00801"
due_date = "2026-02-01"
payment_method = "TRF"
sign = 1
amount = 999.0
pending = true

[[invoices]]
type = "FAC"
entry = "SE0025009997"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00802"
due_date = "2026-02-01"
payment_method = "TRF"
sign = 1
amount = 999.0
pending = false
"#;

#[test]
fn test_help() {
    dunning_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CLI receivables dashboard and reminder system",
        ));
}

#[test]
fn test_version() {
    dunning_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dunning"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");

    dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized dunning config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("clients.toml").exists());
    assert!(config_path.join("invoices.toml").exists());
    assert!(config_path.join("actions.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");

    init_config(&config_path);

    dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_stats_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_stats_dedupes_shared_clients() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(&config_path, LEDGER_FIXTURE);

    // 00542 spans S005 and S001 but counts once; excluded rows never count
    dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Companies pending: 2"))
        .stdout(predicate::str::contains("Invoices pending:  3"))
        .stdout(predicate::str::contains("Amount owed:       180.00"));
}

#[test]
fn test_stats_most_overdue_comes_first() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(&config_path, LEDGER_FIXTURE);

    let output = dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "stats"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Oldest due date (2026-01-15) is listed before the others
    let first = stdout.find("SE0025001972").unwrap();
    let second = stdout.find("SE0025002044").unwrap();
    assert!(first < second);
}

#[test]
fn test_clients_enrichment_and_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(&config_path, LEDGER_FIXTURE);

    // 542 exists in the template client master; 700 does not
    dunning_cmd()
        .args(["-C", config_path.to_str().unwrap(), "clients"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Client S.L."))
        .stdout(predicate::str::contains("(unknown)"))
        .stdout(predicate::str::contains("Total: 2 clients"));
}

#[test]
fn test_invoices_company_filter() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(&config_path, LEDGER_FIXTURE);

    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "invoices",
            "--company",
            "S001",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SE0025002001"))
        .stdout(predicate::str::contains("Total: 1 invoices"));
}

#[test]
fn test_unknown_company_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(&config_path, LEDGER_FIXTURE);

    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "invoices",
            "--company",
            "S999",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the configured company set"));
}

#[test]
fn test_inverted_date_range_is_rejected_before_querying() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    // Deliberately corrupt the ledger: validation must fire first
    write_invoices(&config_path, "not valid toml [");

    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "invoices",
            "--from",
            "2026-06-01",
            "--to",
            "2026-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date range"));
}

#[test]
fn test_report_total_matches_stats_total() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(&config_path, LEDGER_FIXTURE);

    let csv_path = temp_dir.path().join("report.csv");
    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--output",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grand total: 2 unique clients, 180.00"));

    // The exported spreadsheet carries the same grand total to the cent
    let csv = fs::read_to_string(&csv_path).unwrap();
    let grand = csv.lines().find(|l| l.contains("GRAND TOTAL")).unwrap();
    assert!(grand.contains("180.00"));
    assert!(grand.contains(",2,"));
}

#[test]
fn test_report_balance_filters_partition() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_invoices(
        &config_path,
        r#"
[[invoices]]
type = "FAC"
entry = "POS-1"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00100"
due_date = "2026-02-01"
payment_method = "TRF"
sign = 1
amount = 100.0
pending = true

[[invoices]]
type = "ABO"
entry = "NEG-1"
company = "S005"
plant = "P01"
currency = "EUR"
collective = "4300"
client = "00200"
due_date = "2026-02-05"
payment_method = "TRF"
sign = -1
amount = -40.0
pending = true
"#,
    );

    let positive_csv = temp_dir.path().join("positive.csv");
    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--balance",
            "positive",
            "--output",
            positive_csv.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grand total: 1 unique clients, 100.00"));

    let negative_csv = temp_dir.path().join("negative.csv");
    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--balance",
            "negative",
            "--output",
            negative_csv.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grand total: 1 unique clients, -40.00"));

    let positive = fs::read_to_string(&positive_csv).unwrap();
    let negative = fs::read_to_string(&negative_csv).unwrap();
    assert!(positive.contains("00100") && !positive.contains("00200"));
    assert!(negative.contains("00200") && !negative.contains("00100"));
}

#[test]
fn test_report_invalid_balance_filter() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);

    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--balance",
            "sideways",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid balance filter"));
}

#[test]
fn test_actions_due_listing_uses_cutoff() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);
    write_actions(
        &config_path,
        r#"
[[actions]]
id = 1
client = "00542"
type = "FAC"
entry = "SE0025001972"
kind = "Email"
remind_at = "2026-06-01T09:00:00"
created_at = "2026-05-20T12:00:00"
sent = false

[[actions]]
id = 2
client = "00700"
type = "FAC"
entry = "SE0025002044"
kind = "Teams"
remind_at = "2026-08-01T09:00:00"
created_at = "2026-05-20T12:00:00"
sent = false
"#,
    );

    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "actions",
            "--due",
            "--at",
            "2026-06-02",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SE0025001972"))
        .stdout(predicate::str::contains("Email").and(predicate::str::contains("Teams").not()));
}

#[test]
fn test_notify_dry_run_marks_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);

    // Template ships one unsent action due 2026-06-01
    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "notify",
            "--dry-run",
            "--at",
            "2026-06-02",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would send 1 reminder(s)"));

    let actions = fs::read_to_string(config_path.join("actions.toml")).unwrap();
    assert!(actions.contains("sent = false"));
}

#[test]
fn test_notify_without_channels_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);

    // Template config has the notifier section commented out
    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "notify",
            "--at",
            "2026-06-02",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No delivery channels configured"));
}

#[test]
fn test_notify_failure_leaves_action_queued() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dunning-config");
    init_config(&config_path);

    // Point the webhook at a closed local port: dispatch fails fast, and the
    // action must stay queued for the next scheduled run
    let config = fs::read_to_string(config_path.join("config.toml")).unwrap();
    let config = format!(
        "{config}\n[notifier]\ntimeout_secs = 2\n\n[notifier.webhook]\nurl = \"http://127.0.0.1:9/hook\"\n"
    );
    fs::write(config_path.join("config.toml"), config).unwrap();

    dunning_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "notify",
            "--at",
            "2026-06-02",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempted: 1"))
        .stdout(predicate::str::contains("Failed:    1"))
        .stdout(predicate::str::contains("retry on the next run"));

    let actions = fs::read_to_string(config_path.join("actions.toml")).unwrap();
    assert!(actions.contains("sent = false"));
}
