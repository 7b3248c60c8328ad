use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const MONDAY: &str = r#"CS & IT - Monday,,,
,08:00-09:00,09:00-10:00,10:00-11:00
Room/Labs,,,
C-201,"Data Structures (CS 210) Dr. Ali Khan 10234",,Reserved
C-202,,"Calculus I BSCS-3A, BSSE-3A Dr. Uzma 14521",
"#;

const TUESDAY: &str = r#"CS & IT - Tuesday,,,
,08:00-09:00,09:00-10:00,10:00-11:00
Lab 2,"OOP Lab (CS 211L) Mr. Tariq","OOP Lab (CS 211L) Mr. Tariq",
"#;

fn timetable_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_timetable"))
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(timetable_bin())
        .args(args)
        .env("TIMETABLE_HOME", home)
        .env_remove("TIMETABLE_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute timetable CLI")
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let output = run_cli(home, args);
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}",
            err,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_tab(dir: &TempDir, name: &str, text: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

#[derive(Debug, Deserialize)]
struct Entry {
    day: String,
    time_slot: String,
    subject: String,
    course_code: String,
    room_name: String,
    #[serde(default)]
    is_merged_class: bool,
    #[serde(default)]
    is_lab_session: bool,
    #[serde(default)]
    lab_duration: Option<String>,
}

#[test]
fn test_parse_json() {
    let home = TempDir::new().unwrap();
    let file = write_tab(&home, "monday.csv", MONDAY);
    let value = run_json(home.path(), &["parse", &file, "--json"]);
    let entries: Vec<Entry> = serde_json::from_value(value).unwrap();
    assert_eq!(entries.len(), 2);

    let ds = &entries[0];
    assert_eq!(ds.day, "Monday");
    assert_eq!(ds.time_slot, "08:00-09:00");
    assert_eq!(ds.subject, "Data Structures");
    assert_eq!(ds.course_code, "CS 210");
    assert_eq!(ds.room_name, "C-201");

    assert_eq!(entries[1].subject, "Calculus I");
    assert!(entries[1].is_merged_class);

    assert!(home.path().join("logs").join("timetable.log").exists());
}

#[test]
fn test_parse_output_file_with_validation() {
    let home = TempDir::new().unwrap();
    let file = write_tab(&home, "monday.csv", MONDAY);
    let out = home.path().join("out.json");
    let output = run_cli(
        home.path(),
        &["parse", &file, "--output", &out.display().to_string(), "--validation"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["entries"].as_array().map(Vec::len), Some(2));
    assert!(value["validation_log"].is_array());
}

#[test]
fn test_parse_table_summary() {
    let home = TempDir::new().unwrap();
    let file = write_tab(&home, "monday.csv", MONDAY);
    let output = run_cli(home.path(), &["parse", &file]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Data Structures"));
    assert!(stdout.contains("2 entries from"));
}

#[test]
fn test_index_json() {
    let home = TempDir::new().unwrap();
    let file = write_tab(&home, "monday.csv", MONDAY);
    let value = run_json(home.path(), &["index", &file, "--json"]);
    assert_eq!(value["departments"], serde_json::json!(["CS & IT"]));
    let labels = value["subdepartments"]["CS & IT"].as_array().unwrap();
    assert!(labels.iter().any(|l| l == "Computer Science"));
}

#[test]
fn test_bundle_tabs() {
    let home = TempDir::new().unwrap();
    let monday = write_tab(&home, "monday.csv", MONDAY);
    let tuesday = write_tab(&home, "tuesday.csv", TUESDAY);
    let value = run_json(
        home.path(),
        &[
            "bundle",
            "--tab",
            &format!("Monday={monday}"),
            "--tab",
            &format!("Tuesday={tuesday}"),
        ],
    );
    assert!(value["generated_at"].as_str().unwrap().ends_with('Z'));
    let tabs = value["tabs"].as_array().unwrap();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0]["day"], "Monday");
    assert_eq!(tabs[1]["day"], "Tuesday");

    let labs: Vec<Entry> = serde_json::from_value(tabs[1]["entries"].clone()).unwrap();
    assert_eq!(labs.len(), 2);
    assert!(labs.iter().all(|e| e.is_lab_session));
    assert!(labs.iter().all(|e| e.lab_duration.as_deref() == Some("2_hours")));
}

#[test]
fn test_config_file_changes_lab_policy() {
    let home = TempDir::new().unwrap();
    let tuesday = write_tab(&home, "tuesday.csv", TUESDAY);
    fs::write(home.path().join("config.toml"), "[parser]\nlab_departments = [\"PHYSICS\"]\n").unwrap();
    let value = run_json(home.path(), &["parse", &tuesday, "--json"]);
    let entries: Vec<Entry> = serde_json::from_value(value).unwrap();
    assert!(entries.iter().all(|e| !e.is_lab_session));
}

#[test]
fn test_missing_file_is_helpful() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["parse", "/definitely/not/here.csv"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: File not found"));
    assert!(stderr.contains("TRY:"));
}

#[test]
fn test_invalid_config_is_helpful() {
    let home = TempDir::new().unwrap();
    let file = write_tab(&home, "monday.csv", MONDAY);
    let config = home.path().join("bad.toml");
    fs::write(&config, "[parser]\nkeyword_lab_hours = 0\n").unwrap();
    let output = run_cli(home.path(), &["parse", &file, "--config", &config.display().to_string()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: Invalid configuration"));
}

#[test]
fn test_bad_tab_spec() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["bundle", "--tab", "monday.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid tab"));
}
