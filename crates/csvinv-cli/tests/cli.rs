use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const JANUARY: &str = "\
invoice_number,issue_date,issuer_name,issuer_nip,receiver_name,description,quantity,unit_price_net,vat_rate
FV/1/2024,2024-01-15,ABC Sp. z o.o.,526-104-08-28,XYZ S.A.,Consulting,10,150.00,23
FV/1/2024,2024-01-15,ABC Sp. z o.o.,526-104-08-28,XYZ S.A.,Travel,1,200.00,8
FV/2/2024,2024-01-20,ABC Sp. z o.o.,526-104-08-28,QRS,Licence,1,1000.00,23
";

const FEBRUARY_SEMICOLON: &str = "\
numer_faktury;data_wystawienia;sprzedawca;opis;ilosc;cena_netto;stawka_vat
FV/3/2024;01.02.2024;ABC Sp. z o.o.;Hosting;1;99,00;23
";

const BROKEN: &str = "\
invoice_number,issue_date,issuer_name,description,unit_price_net,vat_rate
FV/9/2024,someday,ABC,Widget,10.00,23
";

/// Temp dir with a default config so the user's own config is never read.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, config)
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn csvinv(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("csvinv").unwrap();
    cmd.arg("-c").arg(config);
    cmd
}

#[test]
fn process_prints_json_invoices() {
    let (dir, config) = workspace();
    let input = write(dir.path(), "january.csv", JANUARY);

    csvinv(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"invoice_number\": \"FV/1/2024\""))
        .stdout(predicate::str::contains("\"invoice_number\": \"FV/2/2024\""))
        .stderr(predicate::str::contains("2 invoices from 3 rows"));
}

#[test]
fn process_text_with_delimiter_override() {
    let (dir, config) = workspace();
    let input = write(dir.path(), "february.csv", FEBRUARY_SEMICOLON);

    csvinv(&config)
        .args(["process", "-f", "text", "-d", ";"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice: FV/3/2024"))
        .stdout(predicate::str::contains("Gross: 121,77 PLN"));
}

#[test]
fn process_reports_rejected_rows() {
    let (dir, config) = workspace();
    let input = write(dir.path(), "broken.csv", BROKEN);

    csvinv(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 rows rejected"))
        .stderr(predicate::str::contains("row 2: invalid date 'someday' in issue_date"));
}

#[test]
fn process_missing_file_fails() {
    let (dir, config) = workspace();

    csvinv(&config)
        .arg("process")
        .arg(dir.path().join("missing.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let (dir, config) = workspace();
    let inputs = dir.path().join("in");
    let out = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    write(&inputs, "january.csv", JANUARY);
    write(&inputs, "broken.csv", BROKEN);

    csvinv(&config)
        .arg("batch")
        .arg(format!("{}/*.csv", inputs.display()))
        .arg("-o")
        .arg(&out)
        .args(["-f", "csv", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files to process"))
        .stdout(predicate::str::contains("2 files: 1 completed, 1 with errors, 2 invoices"));

    let january = fs::read_to_string(out.join("january.csv")).unwrap();
    assert_eq!(january.lines().count(), 3);

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("file_id,filename,status"));
    assert!(summary.contains("january.csv,success,3,2"));
    assert!(summary.contains("broken.csv,error,1,0"));
}

#[test]
fn batch_exclude_failed_drops_them_from_stats() {
    let (dir, config) = workspace();
    write(dir.path(), "january.csv", JANUARY);
    write(dir.path(), "broken.csv", BROKEN);

    csvinv(&config)
        .arg("batch")
        .arg(format!("{}/*.csv", dir.path().display()))
        .arg("--exclude-failed")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files: 1 completed, 0 with errors, 2 invoices"));
}

#[test]
fn batch_fail_fast_stops_on_error() {
    let (dir, config) = workspace();
    write(dir.path(), "a_broken.csv", BROKEN);
    write(dir.path(), "b_january.csv", JANUARY);

    csvinv(&config)
        .arg("-v")
        .arg("batch")
        .arg(format!("{}/*.csv", dir.path().display()))
        .arg("--fail-fast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stopping batch after 1 of 2 files"))
        .stderr(predicate::str::contains("b_january.csv").not())
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn batch_without_matches_fails() {
    let (dir, config) = workspace();

    csvinv(&config)
        .arg("batch")
        .arg(format!("{}/*.csv", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn config_set_and_get_round_trip_through_file() {
    let (_dir, config) = workspace();

    csvinv(&config)
        .args(["config", "set", "csv.delimiter", ";"])
        .assert()
        .success();

    csvinv(&config)
        .args(["config", "get", "csv.delimiter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\";\""));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let (dir, config) = workspace();
    let target = dir.path().join("nested").join("config.json");

    csvinv(&config)
        .args(["config", "init", "-o"])
        .arg(&target)
        .assert()
        .success();
    assert!(target.exists());

    csvinv(&config)
        .args(["config", "init", "-o"])
        .arg(&target)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
