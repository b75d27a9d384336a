use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A scratch working directory holding the database and log file.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn db(&self) -> PathBuf {
        self.path().join("snippets.db")
    }

    /// Runs the binary inside the workspace against its database.
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_snippets"))
            .current_dir(self.path())
            .env_remove("SNIPPETS_LOG")
            .args(args)
            .arg("--db")
            .arg(self.db())
            .output()
            .expect("failed to run snippets")
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Snippet commands
// ---------------------------------------------------------------------------

#[test]
fn put_prints_confirmation() {
    let ws = Workspace::new();
    let out = ws.run(&["put", "greeting", "hello world"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), r#"Stored "hello world" as "greeting""#);
}

#[test]
fn put_then_get_returns_text() {
    let ws = Workspace::new();
    ws.run(&["put", "greeting", "hello world"]);

    let out = ws.run(&["get", "greeting"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "hello world");
}

#[test]
fn second_put_overwrites() {
    let ws = Workspace::new();
    ws.run(&["put", "greeting", "hello"]);
    let out = ws.run(&["put", "greeting", "goodbye"]);
    assert!(out.status.success(), "upsert should not fail: {}", stderr(&out));

    let out = ws.run(&["get", "greeting"]);
    assert_eq!(stdout(&out).trim(), "goodbye");
}

#[test]
fn get_missing_is_not_an_error() {
    let ws = Workspace::new();
    ws.run(&["put", "something", "else"]);
    let out = ws.run(&["get", "nothing"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), r#"No snippet found for "nothing""#);
    assert!(stderr(&out).is_empty(), "stderr: {}", stderr(&out));
}

#[test]
fn names_are_stored_verbatim() {
    let ws = Workspace::new();
    for name in ["tab\tname", "   ", "two\nlines"] {
        let out = ws.run(&["put", name, "kept"]);
        assert!(out.status.success(), "stderr: {}", stderr(&out));

        let out = ws.run(&["get", name]);
        assert!(out.status.success());
        assert_eq!(stdout(&out), "kept\n");
    }
}

#[test]
fn read_commands_never_create_a_database() {
    let ws = Workspace::new();
    for args in [
        &["get", "greeting"][..],
        &["catalog"][..],
        &["search", "hello"][..],
        &["export"][..],
    ] {
        let out = ws.run(args);
        assert_eq!(out.status.code(), Some(1), "{args:?} should fail");
        assert!(
            stderr(&out).contains("cannot open database"),
            "stderr: {}",
            stderr(&out)
        );
        assert!(stdout(&out).is_empty(), "stdout: {}", stdout(&out));
        assert!(!ws.db().exists(), "{args:?} created the database");
    }
}

#[test]
fn catalog_lists_every_name() {
    let ws = Workspace::new();
    for name in ["c", "a", "b"] {
        ws.run(&["put", name, "text"]);
    }

    let out = ws.run(&["catalog"]);
    assert!(out.status.success());
    let names: Vec<String> = stdout(&out).lines().map(str::to_owned).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn catalog_empty_database() {
    let ws = Workspace::new();
    ws.run(&["migrate", "up"]);
    let out = ws.run(&["catalog"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "No snippets stored.");
}

#[test]
fn search_prints_matching_pairs() {
    let ws = Workspace::new();
    ws.run(&["put", "greeting", "hello world"]);
    ws.run(&["put", "farewell", "goodbye world"]);
    ws.run(&["put", "other", "nothing to see"]);

    let out = ws.run(&["search", "world"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("greeting: hello world"), "stdout: {text}");
    assert!(text.contains("farewell: goodbye world"), "stdout: {text}");
    assert!(!text.contains("other"), "stdout: {text}");

    let out = ws.run(&["search", "xyz"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), r#"No snippets match "xyz""#);
}

#[test]
fn search_input_is_not_interpreted_as_sql() {
    let ws = Workspace::new();
    ws.run(&["put", "greeting", "hello world"]);

    let out = ws.run(&["search", "' OR 1=1; DROP TABLE snippets; --"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("No snippets match"));

    let out = ws.run(&["get", "greeting"]);
    assert_eq!(stdout(&out).trim(), "hello world");
}

#[test]
fn json_output() {
    let ws = Workspace::new();
    let out = ws.run(&["put", "greeting", "hello world", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["name"], "greeting");
    assert_eq!(value["text"], "hello world");

    let out = ws.run(&["search", "hello", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value[0]["name"], "greeting");

    let out = ws.run(&["get", "missing", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(value["text"].is_null());

    let out = ws.run(&["catalog", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value, serde_json::json!(["greeting"]));
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

#[test]
fn missing_command_prints_usage() {
    let ws = Workspace::new();
    let out = Command::new(env!("CARGO_BIN_EXE_snippets"))
        .current_dir(ws.path())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Usage"), "stderr: {}", stderr(&out));
}

#[test]
fn unknown_command_fails() {
    let ws = Workspace::new();
    let out = ws.run(&["delete", "greeting"]);
    assert!(!out.status.success());
    assert!(!ws.db().exists(), "store must not be touched");
}

#[test]
fn put_missing_text_fails() {
    let ws = Workspace::new();
    let out = ws.run(&["put", "greeting"]);
    assert!(!out.status.success());
    assert!(!ws.db().exists());
}

#[test]
fn put_empty_name_fails_before_opening_store() {
    let ws = Workspace::new();
    let out = ws.run(&["put", "", "text"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("snippet name cannot be empty"));
    assert!(!ws.db().exists());
}

#[test]
fn invalid_table_name_fails() {
    let ws = Workspace::new();
    let out = ws.run(&["catalog", "--table", "bad-name"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid table name"));
}

#[test]
fn unreachable_database_fails() {
    let ws = Workspace::new();
    let out = Command::new(env!("CARGO_BIN_EXE_snippets"))
        .current_dir(ws.path())
        .args(["put", "greeting", "hello", "--db"])
        .arg(ws.path().join("missing_dir").join("snippets.db"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("cannot open database"), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// Configuration and logging
// ---------------------------------------------------------------------------

#[test]
fn config_file_without_auto_migrate_requires_setup() {
    let ws = Workspace::new();
    fs::write(ws.path().join("snippets.yml"), "auto_migrate: false\n").unwrap();

    let out = ws.run(&["put", "greeting", "hello"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("does not exist"), "stderr: {}", stderr(&out));

    let out = ws.run(&["migrate", "up"]);
    assert!(out.status.success());
    let out = ws.run(&["put", "greeting", "hello"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn config_file_selects_table() {
    let ws = Workspace::new();
    let config = ws.path().join("custom.yml");
    fs::write(&config, "table: notes\n").unwrap();

    let out = ws.run(&["put", "k", "v", "--config", config.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = ws.run(&["get", "k"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("table 'snippets' does not exist"));
    let out = ws.run(&["get", "k", "--table", "notes"]);
    assert_eq!(stdout(&out).trim(), "v");
}

#[test]
fn log_file_is_written() {
    let ws = Workspace::new();
    ws.run(&["put", "greeting", "hello world"]);

    let log = fs::read_to_string(ws.path().join("snippets.log")).expect("log file missing");
    assert!(log.contains("stored snippet"), "log: {log}");
}

#[test]
fn logging_can_be_disabled() {
    let ws = Workspace::new();
    fs::write(ws.path().join("snippets.yml"), "log_file: null\n").unwrap();
    let out = ws.run(&["put", "greeting", "hello world"]);
    assert!(out.status.success());
    assert!(!ws.path().join("snippets.log").exists());
}

// ---------------------------------------------------------------------------
// Setup tooling
// ---------------------------------------------------------------------------

#[test]
fn migrate_up_and_status() {
    let ws = Workspace::new();
    let out = ws.run(&["migrate", "status"]);
    assert!(stdout(&out).contains("Table exists: no"));

    let out = ws.run(&["migrate", "up"]);
    assert!(out.status.success(), "migrate up should succeed");

    ws.run(&["put", "a", "1"]);
    let out = ws.run(&["migrate", "status"]);
    let text = stdout(&out);
    assert!(text.contains("Table exists: yes"), "stdout: {text}");
    assert!(text.contains("Snippet count: 1"), "stdout: {text}");
}

#[test]
fn migrate_down_drops_snippets() {
    let ws = Workspace::new();
    ws.run(&["put", "a", "1"]);
    let out = ws.run(&["migrate", "down"]);
    assert!(out.status.success());

    let out = ws.run(&["migrate", "status"]);
    assert!(stdout(&out).contains("Table exists: no"));
    let out = ws.run(&["catalog"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn migrate_seed_and_export() {
    let ws = Workspace::new();
    let source = ws.path().join("seed.json");
    let bundle = serde_json::json!({
        "snippets": [
            {"name": "greeting", "text": "hello world"},
            {"name": "farewell", "text": "goodbye"}
        ]
    });
    fs::write(&source, serde_json::to_string_pretty(&bundle).unwrap()).unwrap();

    ws.run(&["migrate", "up"]);
    ws.run(&["put", "greeting", "old text"]);
    let out = ws.run(&["migrate", "seed", "--source", source.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Snippets inserted: 1"), "stdout: {text}");
    assert!(text.contains("Snippets updated: 1"), "stdout: {text}");

    let exported = ws.path().join("out").join("export.json");
    let out = ws.run(&["export", "--output", exported.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Exported 2 snippet(s)"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&exported).unwrap()).unwrap();
    assert_eq!(value["snippets"][0]["name"], "farewell");
    assert_eq!(value["snippets"][1]["text"], "hello world");
}

#[test]
fn migrate_seed_rejects_duplicate_names() {
    let ws = Workspace::new();
    let source = ws.path().join("dupes.json");
    fs::write(
        &source,
        r#"{"snippets": [{"name": "a", "text": "1"}, {"name": "a", "text": "2"}]}"#,
    )
    .unwrap();

    ws.run(&["migrate", "up"]);
    let out = ws.run(&["migrate", "seed", "--source", source.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("duplicate snippet"), "stderr: {}", stderr(&out));
}
