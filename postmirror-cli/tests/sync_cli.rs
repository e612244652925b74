use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn postmirror_cmd(home: &Path, workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_postmirror"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG")
        .current_dir(workdir);
    cmd
}

fn write_source(dir: &Path, json: &str) -> String {
    let path = dir.join("records.json");
    fs::write(&path, json).expect("write source");
    path.to_string_lossy().into_owned()
}

struct Fixture {
    home: TempDir,
    work: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("home"),
            work: TempDir::new().expect("work"),
        }
    }

    fn cmd(&self) -> Command {
        postmirror_cmd(self.home.path(), self.work.path())
    }

    fn store(&self) -> std::path::PathBuf {
        self.work.path().join("src").join("posts")
    }

    fn archive(&self) -> std::path::PathBuf {
        self.work.path().join("archived")
    }
}

#[test]
fn sync_creates_files_and_prints_summary() {
    let fx = Fixture::new();
    let source = write_source(
        fx.work.path(),
        r#"[{"id": 1, "content": "hello"}, {"id": 2, "file_name": "about.md", "content": "me"}]"#,
    );

    fx.cmd()
        .args(["sync", "--source", &source])
        .assert()
        .success()
        .stdout(contains("2 created"))
        .stdout(contains("post-1.md"))
        .stdout(contains("about.md"));

    assert_eq!(fs::read_to_string(fx.store().join("post-1.md")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(fx.store().join("about.md")).unwrap(), "me");
}

#[test]
fn second_sync_reports_nothing_to_do() {
    let fx = Fixture::new();
    let source = write_source(fx.work.path(), r#"[{"id": 1, "content": "hello"}]"#);

    fx.cmd().args(["sync", "--source", &source]).assert().success();
    fx.cmd()
        .args(["sync", "--source", &source])
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn removed_records_are_archived() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.store()).unwrap();
    fs::write(fx.store().join("post-9.md"), "retired").unwrap();
    let source = write_source(fx.work.path(), r#"[{"id": 1, "content": "hello"}]"#);

    fx.cmd()
        .args(["sync", "--source", &source])
        .assert()
        .success()
        .stdout(contains("1 archived"))
        .stderr(contains("archived:").and(contains("post-9.md")));

    assert!(!fx.store().join("post-9.md").exists());
    assert_eq!(fs::read_to_string(fx.archive().join("post-9.md")).unwrap(), "retired");
}

#[test]
fn empty_source_is_guarded_unless_allowed() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.store()).unwrap();
    fs::write(fx.store().join("post-1.md"), "keep me").unwrap();
    let source = write_source(fx.work.path(), "[]");

    fx.cmd()
        .args(["sync", "--source", &source])
        .assert()
        .success()
        .stdout(contains("--allow-empty"));
    assert!(fx.store().join("post-1.md").exists(), "guard must not archive");

    fx.cmd()
        .args(["sync", "--source", &source, "--allow-empty"])
        .assert()
        .success();
    assert!(!fx.store().join("post-1.md").exists());
    assert!(fx.archive().join("post-1.md").exists());
}

#[test]
fn dry_run_reports_files_and_writes_nothing() {
    let fx = Fixture::new();
    let source = write_source(fx.work.path(), r#"[{"id": 1, "content": "hello"}]"#);

    fx.cmd()
        .args(["sync", "--dry-run", "--source", &source])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("post-1.md"));

    assert!(!fx.store().exists(), "dry-run must not create the store");
}

#[test]
fn json_report_lists_result_sets() {
    let fx = Fixture::new();
    let source = write_source(
        fx.work.path(),
        r#"[{"id": 1, "content": "a"}, {"id": "", "content": "no name"}]"#,
    );

    let output = fx
        .cmd()
        .args(["sync", "--json", "--source", &source])
        .output()
        .expect("run sync --json");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["created"], serde_json::json!(["post-1.md"]));
    assert_eq!(report["skipped"][0]["identifier"], "");
    assert_eq!(report["skipped"][0]["reason"]["kind"], "blank_identifier");
    assert_eq!(report["dry_run"], false);
}

#[test]
fn unreadable_source_fails_without_touching_store() {
    let fx = Fixture::new();
    let missing = fx.work.path().join("missing.json");

    fx.cmd()
        .args(["sync", "--source"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(contains("failed to fetch records"));

    assert!(!fx.store().exists());
}

#[test]
fn sync_without_source_fails_with_hint() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("no source configured"));
}

#[test]
fn init_then_sync_uses_saved_config() {
    let fx = Fixture::new();
    let source = write_source(fx.work.path(), r#"[{"id": 5, "content": "five"}]"#);
    let store = fx.work.path().join("content");

    fx.cmd()
        .args(["init", "--source", &source, "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(contains("Wrote config"));
    assert!(fx.home.path().join(".postmirror").join("config.yaml").exists());

    fx.cmd()
        .args(["init", "--source", &source])
        .assert()
        .failure()
        .stderr(contains("--force"));

    fx.cmd().arg("sync").assert().success();
    assert_eq!(fs::read_to_string(store.join("post-5.md")).unwrap(), "five");
}

#[test]
fn status_lists_pending_actions() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.store()).unwrap();
    fs::write(fx.store().join("post-1.md"), "old").unwrap();
    fs::write(fx.store().join("gone.md"), "bye").unwrap();
    let source = write_source(
        fx.work.path(),
        r#"[{"id": 1, "content": "new"}, {"id": 2, "content": "two"}]"#,
    );

    let output = fx
        .cmd()
        .args(["status", "--json", "--source", &source])
        .output()
        .expect("run status --json");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["summary"]["pending"], 3);
    let statuses: Vec<(String, String)> = report["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["file"].as_str().unwrap().to_string(),
                f["status"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert!(statuses.contains(&("post-1.md".into(), "update".into())));
    assert!(statuses.contains(&("post-2.md".into(), "create".into())));
    assert!(statuses.contains(&("gone.md".into(), "archive".into())));
    assert_eq!(fs::read_to_string(fx.store().join("post-1.md")).unwrap(), "old");
}

#[test]
fn diff_shows_changes_without_writing() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.store()).unwrap();
    fs::write(fx.store().join("post-1.md"), "old line\n").unwrap();
    let source = write_source(fx.work.path(), r#"[{"id": 1, "content": "new line\n"}]"#);

    fx.cmd()
        .args(["diff", "--source", &source])
        .assert()
        .success()
        .stdout(contains("-old line").and(contains("+new line")));

    assert_eq!(
        fs::read_to_string(fx.store().join("post-1.md")).unwrap(),
        "old line\n"
    );
}
