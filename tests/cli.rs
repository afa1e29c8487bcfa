use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracker::model::ExportData;

struct TestEnv {
    tmp: TempDir,
    db: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let db = tmp.path().join("data").join("tracker.db");
        Self { tmp, db }
    }

    fn dir(&self) -> &Path {
        self.tmp.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tracker").expect("binary built");
        cmd.current_dir(self.tmp.path())
            .env_remove("TRACKER_TEST_DB")
            .env_remove("RUST_LOG")
            .arg("--db")
            .arg(&self.db);
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    fn fail_json(&self, args: &[&str], exit_code: i32) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .code(exit_code)
            .get_output()
            .stderr
            .clone();
        serde_json::from_slice(&out).expect("structured error on stderr")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }
}

#[test]
fn version_reports_backup_format() {
    let env = TestEnv::new();
    let out = env.run_json(&["version"]);
    assert_eq!(out["backupFormat"], "1.0");
}

#[test]
fn activity_lifecycle() {
    let env = TestEnv::new();

    let created = env.run_json(&["activity", "add", "<b>Exercise</b>", "--color", "#F00"]);
    assert_eq!(created["name"], "Exercise");
    assert_eq!(created["color"], "#F00");
    let id = created["id"].as_str().unwrap().to_string();

    let listed = env.run_json(&["activity", "list"]);
    assert_eq!(listed["count"], 1);

    let updated = env.run_json(&["activity", "update", "exercise", "--name", "Running"]);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["name"], "Running");
    assert!(updated["updatedAt"].is_string());

    let deleted = env.run_json(&["activity", "delete", &id]);
    assert_eq!(deleted["logsRemoved"], 0);
    assert_eq!(env.run_json(&["activity", "list"])["count"], 0);
}

#[test]
fn invalid_color_is_rejected() {
    let env = TestEnv::new();
    let err = env.fail_json(&["activity", "add", "Read", "--color", "blue"], 4);
    assert_eq!(err["error"]["code"], "INVALID_ARGUMENT");
}

#[test]
fn unknown_activity_suggests_similar() {
    let env = TestEnv::new();
    env.run_json(&["activity", "add", "Exercise"]);

    let err = env.fail_json(&["log", "mark", "Excercise"], 3);
    assert_eq!(err["error"]["code"], "ACTIVITY_NOT_FOUND");
    assert!(err["error"]["hint"].as_str().unwrap().contains("Exercise"));
}

#[test]
fn marking_feeds_stats() {
    let env = TestEnv::new();
    env.run_json(&["activity", "add", "Read"]);

    let log = env.run_json(&["log", "mark", "Read", "--notes", "chapter 3"]);
    assert_eq!(log["completed"], true);
    assert_eq!(log["notes"], "chapter 3");

    let stats = env.run_json(&["stats", "--days", "7", "--heatmap"]);
    assert_eq!(stats["days"], 7);
    assert_eq!(stats["activities"][0]["totalCompletions"], 1);
    assert_eq!(stats["activities"][0]["currentStreak"], 1);
    let heatmap = stats["heatmap"].as_array().unwrap();
    assert_eq!(heatmap.len(), 7);
    assert_eq!(heatmap[6]["level"], 4);

    let unmarked = env.run_json(&["log", "unmark", "Read"]);
    assert_eq!(unmarked["completed"], false);
    assert_eq!(unmarked["notes"], "chapter 3");
}

#[test]
fn unmark_without_log_is_not_found() {
    let env = TestEnv::new();
    env.run_json(&["activity", "add", "Read"]);

    let err = env.fail_json(&["log", "unmark", "Read", "--date", "2024-01-01"], 3);
    assert_eq!(err["error"]["code"], "LOG_NOT_FOUND");
}

#[test]
fn invalid_date_is_rejected() {
    let env = TestEnv::new();
    env.run_json(&["activity", "add", "Read"]);
    env.fail_json(&["log", "mark", "Read", "--date", "2023-02-29"], 4);
}

#[test]
fn export_json_then_import_into_fresh_store() {
    let env = TestEnv::new();
    env.run_json(&["activity", "add", "Read"]);
    env.run_json(&["log", "mark", "Read", "--date", "2024-02-29", "--notes", "a, \"b\""]);

    let exported = env.run_json(&["export", "--output", "backup.json"]);
    assert_eq!(exported["stats"]["activities"], 1);
    assert_eq!(exported["stats"]["logs"], 1);

    let backup = env.dir().join("backup.json");
    let bundle: ExportData =
        serde_json::from_str(&fs::read_to_string(&backup).unwrap()).expect("bundle parses");
    assert_eq!(bundle.version, "1.0");
    assert_eq!(bundle.logs[0].notes.as_deref(), Some("a, \"b\""));

    let other = TestEnv::new();
    let imported = other.run_json(&["import", backup.to_str().unwrap()]);
    assert_eq!(imported["mode"], "merge");
    assert_eq!(imported["stats"]["activities"]["added"], 1);
    assert_eq!(imported["stats"]["logs"]["added"], 1);

    // Importing the same file again adds nothing.
    let again = other.run_json(&["import", backup.to_str().unwrap()]);
    assert_eq!(again["stats"]["activities"]["added"], 0);
    assert_eq!(again["stats"]["activities"]["skipped"], 1);
}

#[test]
fn export_default_file_name() {
    let env = TestEnv::new();
    let exported = env.run_json(&["export", "--format", "csv"]);

    let path = PathBuf::from(exported["path"].as_str().unwrap());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("activity-tracker-backup-"));
    assert!(name.ends_with(".csv"));

    let csv = fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("# Activities\nid,name,color,createdAt,updatedAt"));
    assert!(csv.contains("\n\n# Logs\n"));
}

#[test]
fn import_replace_discards_existing() {
    let env = TestEnv::new();
    env.run_json(&["activity", "add", "Old"]);

    let file = env.write(
        "replace.json",
        r##"{"activities":[{"id":"a1","name":"Exercise","color":"#10B981","createdAt":"2024-01-15T10:00:00.000Z"}],"logs":[]}"##,
    );
    let imported = env.run_json(&["import", file.to_str().unwrap(), "--replace"]);
    assert_eq!(imported["mode"], "replace");
    assert_eq!(imported["stats"]["activities"]["removed"], 1);

    let listed = env.run_json(&["activity", "list"]);
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["activities"][0]["id"], "a1");
}

#[test]
fn malformed_import_is_rejected_with_details() {
    let env = TestEnv::new();
    let file = env.write(
        "bad.json",
        r#"{"activities":[{"id":"","name":"","color":"red"}],"logs":[]}"#,
    );

    let err = env.fail_json(&["import", file.to_str().unwrap()], 4);
    assert_eq!(err["error"]["code"], "IMPORT_REJECTED");
    assert!(err["error"]["details"].as_array().unwrap().len() >= 4);
}

#[test]
fn import_rejects_non_json_files() {
    let env = TestEnv::new();
    let file = env.write("backup.csv", "# Activities\n");

    let err = env.fail_json(&["import", file.to_str().unwrap()], 6);
    assert_eq!(err["error"]["code"], "SYNC_ERROR");
}

#[test]
fn human_output_for_import_errors() {
    let env = TestEnv::new();
    let file = env.write("broken.json", "{not json");

    env.cmd()
        .args(["import", file.to_str().unwrap()])
        .env("NO_COLOR", "1")
        .assert()
        .failure()
        .code(4)
        .stderr(contains("Invalid JSON format"));
}

#[test]
fn completions_generate() {
    let env = TestEnv::new();
    env.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(contains("tracker"));
}
