use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn swat_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("swat");
    path
}

const MINE: &str = "Keyword,Pos,URL,Volume\nShoes,3,/shoes,1000\nSocks,1,/socks,300\n";
const RIVAL: &str = "\u{feff}Parola chiave,Landing Page\nscarpe,/r/scarpe\n";
const COMP_A: &str =
    "keyword,position,url,Volume,Key Diff\r\nshoes,5,/a/shoes,1000,30\r\nBoots,2,/a/boots,450,12\r\n";

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let exports = root.join("exports");
    fs::create_dir_all(&exports).unwrap();
    fs::write(exports.join("a_mine.csv"), MINE).unwrap();
    fs::write(exports.join("b_comp_a.csv"), COMP_A).unwrap();

    let config_content = r#"[comparison]
chunk_size = 1
primary_label = "Mio Sito"

[report]
top_gaps = 5
"#;
    let config_path = config_dir.join("swat.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_swat(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = swat_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run swat binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn export_path(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("exports")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_compare_table_report() {
    let (_tmp, config_path) = setup_test_env();
    let mine = export_path(&config_path, "a_mine.csv");
    let comp = format!("CompA={}", export_path(&config_path, "b_comp_a.csv"));

    let (stdout, stderr, success) = run_swat(
        &config_path,
        &["compare", "--primary", &mine, "--competitor", &comp, "--progress", "off"],
    );
    assert!(success, "compare failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Primary:     Mio Sito"));
    assert!(stdout.contains("Keywords:    3"));
    assert!(stdout.contains("Common:      1"));
    assert!(stdout.contains("Only mine:   1"));
    assert!(stdout.contains("Only theirs: 1"));
    assert!(stdout.contains("CompA"));
}

#[test]
fn test_compare_csv_export() {
    let (_tmp, config_path) = setup_test_env();
    let mine = format!("Mio Sito={}", export_path(&config_path, "a_mine.csv"));
    let comp = format!("CompA={}", export_path(&config_path, "b_comp_a.csv"));

    let (stdout, stderr, success) = run_swat(
        &config_path,
        &[
            "compare",
            "--primary",
            &mine,
            "--competitor",
            &comp,
            "--format",
            "csv",
            "--progress",
            "off",
        ],
    );
    assert!(success, "compare failed: stderr={}", stderr);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("keyword,status,Mio Sito position"));
    assert_eq!(
        lines[1],
        "boots,comparisonOnly,N/A,N/A,2,/a/boots,450,12,N/A,N/A"
    );
    assert_eq!(
        lines[2],
        "shoes,common,3,/shoes,5,/a/shoes,1000,N/A,N/A,N/A"
    );
    assert_eq!(lines[3], "socks,primaryOnly,1,/socks,N/A,N/A,300,N/A,N/A,N/A");
}

#[test]
fn test_compare_json_to_file() {
    let (tmp, config_path) = setup_test_env();
    let mine = export_path(&config_path, "a_mine.csv");
    let comp = format!("CompA={}", export_path(&config_path, "b_comp_a.csv"));
    let out = tmp.path().join("out/run.json");

    let (_, stderr, success) = run_swat(
        &config_path,
        &[
            "compare",
            "--primary",
            &mine,
            "--competitor",
            &comp,
            "--format",
            "json",
            "--output",
            out.to_str().unwrap(),
            "--progress",
            "json",
        ],
    );
    assert!(success, "compare failed: stderr={}", stderr);
    assert!(stderr.contains("\"phase\":\"comparing\""));
    assert!(stderr.contains("Exported 3 keywords"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["primary"], "Mio Sito");
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
    assert_eq!(json["summary"]["comparisonOnly"], 1);
    assert_eq!(json["sources"][0]["sha256"].as_str().unwrap().len(), 64);
}

#[test]
fn test_compare_dir_discovery() {
    let (_tmp, config_path) = setup_test_env();
    let dir = config_path.parent().unwrap().parent().unwrap().join("exports");

    let (stdout, stderr, success) = run_swat(
        &config_path,
        &[
            "compare",
            "--dir",
            dir.to_str().unwrap(),
            "--format",
            "csv",
            "--progress",
            "off",
        ],
    );
    assert!(success, "compare --dir failed: stderr={}", stderr);
    assert!(stdout.starts_with("keyword,status,Mio Sito position,Mio Sito url,b_comp_a position"));
}

#[test]
fn test_compare_schema_error_names_file() {
    let (tmp, config_path) = setup_test_env();
    let bad = tmp.path().join("rival.csv");
    fs::write(&bad, RIVAL).unwrap();
    let mine = export_path(&config_path, "a_mine.csv");
    let rival = format!("Rivale={}", bad.display());

    let (_, stderr, success) = run_swat(
        &config_path,
        &["compare", "--primary", &mine, "--competitor", &rival, "--progress", "off"],
    );
    assert!(!success);
    assert!(stderr.contains("Rivale"));
    assert!(stderr.contains("required column 'Pos'"));
}

#[test]
fn test_compare_nothing_to_analyze() {
    let (tmp, config_path) = setup_test_env();
    let empty = tmp.path().join("empty.csv");
    fs::write(&empty, "Keyword,Pos,URL\n").unwrap();

    let (_, stderr, success) = run_swat(
        &config_path,
        &["compare", "--primary", empty.to_str().unwrap(), "--progress", "off"],
    );
    assert!(!success);
    assert!(stderr.contains("Nothing to analyze"));
}

#[test]
fn test_inspect_shows_resolution() {
    let (_tmp, config_path) = setup_test_env();
    let comp = export_path(&config_path, "b_comp_a.csv");

    let (stdout, stderr, success) = run_swat(&config_path, &["inspect", &comp]);
    assert!(success, "inspect failed: stderr={}", stderr);
    assert!(stdout.contains("Keyword Difficulty"));
    assert!(stdout.contains("Key Diff"));
    assert!(stdout.contains("Records:  2"));
}

#[test]
fn test_schema_lists_aliases() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_swat(&config_path, &["schema", "--schema", "pertinence"]);
    assert!(success);
    assert!(stdout.contains("Schema: pertinence"));
    assert!(stdout.contains("Parola chiave"));
    assert!(!stdout.contains("cpc medio"));
}

#[test]
fn test_sources_health() {
    let (_tmp, config_path) = setup_test_env();
    let dir = config_path.parent().unwrap().parent().unwrap().join("exports");

    let (stdout, _, success) = run_swat(&config_path, &["sources", dir.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("a_mine"));
    assert!(stdout.contains("b_comp_a"));
    assert!(stdout.contains("OK"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("absent.toml");
    let (stdout, _, success) = run_swat(&config_path, &["schema"]);
    assert!(success);
    assert!(stdout.contains("Schema: ranking"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("swat.toml");
    fs::write(&config_path, "[comparison]\nchunk_size = 0\n").unwrap();
    let (_, stderr, success) = run_swat(&config_path, &["schema"]);
    assert!(!success);
    assert!(stderr.contains("chunk_size"));
}

#[test]
fn test_short_help_banner_is_plain_ascii() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_swat(&config_path, &["-h"]);
    assert!(success);
    assert!(stdout.contains("ANALISI S.W.A.T.: keyword comparison across SEO ranking exports"));
    assert!(stdout.is_ascii());
}

#[test]
fn test_compare_csv_quotes_commas() {
    let (tmp, config_path) = setup_test_env();
    let mine = tmp.path().join("mine.csv");
    fs::write(&mine, "Keyword,Pos,URL\n\"shoes, red\",2,/red\n").unwrap();

    let (stdout, stderr, success) = run_swat(
        &config_path,
        &[
            "compare",
            "--primary",
            mine.to_str().unwrap(),
            "--format",
            "csv",
            "--progress",
            "off",
        ],
    );
    assert!(success, "compare failed: stderr={}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[1], "\"shoes, red\",primaryOnly,2,/red,N/A,N/A,N/A,N/A");
}
