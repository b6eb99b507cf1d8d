mod common;

use common::{aacboard, cell_ids, closed_base, of_kind, parse_jsonl};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture_store() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("patients_v1.json")
}

fn seed_store(data: &Path) {
    fs::create_dir_all(data).unwrap();
    fs::copy(fixture_store(), data.join("patients.json")).unwrap();
}

#[test]
fn patient_add_twice_keeps_one_entry() {
    let temp = tempdir().unwrap();

    let assert = aacboard(temp.path())
        .args(["patient", "add", "Maria"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items[0]["data"]["created"], true);

    let assert = aacboard(temp.path())
        .args(["patient", "add", "  Maria  "])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items[0]["patient"], "Maria");
    assert_eq!(items[0]["data"]["created"], false);

    let assert = aacboard(temp.path())
        .args(["patient", "list"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items.len(), 1);

    let store: Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("patients.json")).unwrap())
            .unwrap();
    assert_eq!(store["version"], "1");
    assert!(store["patients"]["Maria"].is_object());
}

#[test]
fn re_registering_keeps_history() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    aacboard(temp.path())
        .args(["patient", "add", "Maria"])
        .assert()
        .success();

    let assert = aacboard(temp.path())
        .args(["history", "--patient", "Maria"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(of_kind(&items, "board").len(), 2);
}

#[test]
fn patient_add_rejects_blank_name() {
    let temp = tempdir().unwrap();

    aacboard(temp.path())
        .args(["patient", "add", "   "])
        .assert()
        .failure()
        .stdout(predicates::str::contains("EMPTY_NAME"));

    assert!(!temp.path().join("patients.json").exists());
}

#[test]
fn patient_list_is_sorted() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    let assert = aacboard(temp.path())
        .args(["patient", "list"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let names: Vec<_> = items
        .iter()
        .map(|v| v["patient"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Joana", "Maria"]);
    assert_eq!(items[1]["data"]["boards"], 2);
}

#[test]
fn history_keeps_board_and_cell_order() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    let assert = aacboard(temp.path())
        .args(["history", "--patient", "Maria"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let boards = of_kind(&items, "board");
    assert_eq!(boards[0]["board"], 1);
    assert_eq!(boards[0]["excerpt"], "quero beber água");
    assert_eq!(boards[1]["board"], 2);
    assert_eq!(boards[1]["data"]["missing"], 1);

    assert_eq!(
        cell_ids(&items),
        vec![
            Some("5441".to_string()),
            Some("2248".to_string()),
            Some("2445".to_string()),
            Some("7013".to_string()),
            None,
        ]
    );
}

#[test]
fn history_markdown_has_one_table_per_board() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    let assert = aacboard(temp.path())
        .args(["--format", "md", "history", "--patient", "Maria"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    assert!(stdout.contains("## Board 1 - Maria"));
    assert!(stdout.contains("## Board 2 - Maria"));
    assert_eq!(stdout.matches("| # | Word | Pictogram | Source |").count(), 2);
    assert!(stdout.contains("| 2 | xklqz | - | missing |"));
}

#[test]
fn generate_rejects_blank_phrase_before_network() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    aacboard(temp.path())
        .args(["--api-base", closed_base().as_str()])
        .args(["board", "generate", "--patient", "Maria", "   "])
        .assert()
        .failure()
        .stdout(predicates::str::contains("EMPTY_PHRASE"));
}

#[test]
fn generate_rejects_unknown_patient() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    aacboard(temp.path())
        .args(["--api-base", closed_base().as_str()])
        .args(["board", "generate", "--patient", "Pedro", "quero"])
        .assert()
        .failure()
        .stdout(predicates::str::contains("UNKNOWN_PATIENT"));

    assert!(!temp.path().join("drafts").exists());
}

#[test]
fn corrupt_store_is_left_untouched() {
    let temp = tempdir().unwrap();
    let store = temp.path().join("patients.json");
    fs::write(&store, "{ not json").unwrap();

    aacboard(temp.path())
        .args(["patient", "add", "Maria"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("not valid JSON"));

    assert_eq!(fs::read_to_string(&store).unwrap(), "{ not json");
}

#[test]
fn export_saved_board_without_images() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());
    let out = temp.path().join("maria.pdf");

    let assert = aacboard(temp.path())
        .args(["export", "--patient", "Maria", "--board", "2", "--no-images"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let export = of_kind(&items, "export");
    assert_eq!(export[0]["board"], 2);
    assert_eq!(export[0]["data"]["missing"], 1);
    assert!(fs::read(&out).unwrap().starts_with(b"%PDF"));
}

#[test]
fn export_rejects_missing_board() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    aacboard(temp.path())
        .args(["export", "--patient", "Joana", "--board", "1", "--no-images"])
        .assert()
        .failure()
        .stdout(predicates::str::contains("BAD_INDEX"));
}

#[test]
fn export_needs_a_board_selector() {
    let temp = tempdir().unwrap();

    aacboard(temp.path())
        .args(["export", "--patient", "Maria"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--board"));
}

#[test]
fn doctor_reports_unreachable_service() {
    let temp = tempdir().unwrap();

    let assert = aacboard(temp.path())
        .args(["--api-base", closed_base().as_str(), "--timeout", "2", "doctor"])
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let checks: Vec<_> = items
        .iter()
        .map(|v| v["data"]["check"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(checks, vec!["data-dir", "store", "pictogram-search", "llm-api-key"]);
    assert_eq!(items[0]["data"]["ok"], true);
    assert_eq!(items[2]["kind"], "error");
    assert_eq!(items[2]["errors"][0]["code"], "CHECK_FAILED");
}

#[test]
fn raw_format_prints_summary_lines() {
    let temp = tempdir().unwrap();
    seed_store(temp.path());

    aacboard(temp.path())
        .args(["--format", "raw", "patient", "list"])
        .assert()
        .success()
        .stdout("Joana\nMaria\n");
}
