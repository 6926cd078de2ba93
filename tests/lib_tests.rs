use clap::Parser;
use rechunk::engine::{Cli, batch_file_name, build_opts, glob_match, should_include_input};
use rechunk::pipeline::ErrorLedger;
use rechunk::{ErrorEntry, OutputOrder, PipelineError, Stage};
use std::fs;
use std::path::PathBuf;

// --- glob_match ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("users.json", "users.json"));
    assert!(!glob_match("users.json", "users.jso"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("*.json", "a.json"));
    assert!(!glob_match("*.json", "a.json.bak"));
    assert!(glob_match("users_*", "users_001.json"));
    assert!(glob_match("*", "anything"));
}

#[test]
fn test_glob_match_star_in_middle() {
    assert!(glob_match("export-*.json", "export-2024.json"));
    assert!(glob_match("export-*.json", "export-.json"));
    assert!(!glob_match("export-*.json", "import-2024.json"));
}

#[test]
fn test_glob_match_skips_dotfiles() {
    assert!(!glob_match("*.json", ".hidden.json"));
    assert!(!glob_match("*.json", ".json"));
    assert!(!glob_match("?users.json", ".users.json"));
    assert!(glob_match(".*.json", ".hidden.json"));
    assert!(glob_match("*?json", "a.json"));
}

#[test]
fn test_glob_match_question() {
    assert!(glob_match("part?.json", "part1.json"));
    assert!(!glob_match("part?.json", "part.json"));
    assert!(!glob_match("part?.json", "part12.json"));
}

// --- should_include_input ---

#[test]
fn test_should_include_matching_name() {
    assert!(should_include_input(&PathBuf::from("/in/users.json"), "*.json"));
}

#[test]
fn test_should_include_non_matching_name() {
    assert!(!should_include_input(&PathBuf::from("/in/users.csv"), "*.json"));
}

#[test]
fn test_should_include_os_metadata_skipped() {
    assert!(!should_include_input(&PathBuf::from("/in/._users.json"), "*.json"));
    assert!(!should_include_input(&PathBuf::from("/in/.DS_Store"), "*"));
    assert!(!should_include_input(&PathBuf::from("/in/.users.json"), "*.json"));
}

// --- batch naming ---

#[test]
fn test_batch_file_name_padding() {
    assert_eq!(batch_file_name("users", 0), "users_000.json");
    assert_eq!(batch_file_name("users", 42), "users_042.json");
    assert_eq!(batch_file_name("users", 1234), "users_1234.json");
}

// --- error ledger ---

#[test]
fn test_stage_names() {
    assert_eq!(Stage::Read.to_string(), "read");
    assert_eq!(Stage::ChunkRead.to_string(), "chunk-read");
    assert_eq!(Stage::Transform.to_string(), "transform");
}

#[test]
fn test_ledger_records_stage_and_reason() {
    let ledger = ErrorLedger::new();
    let path = PathBuf::from("in/b.json");
    ledger.record(
        &path,
        &PipelineError::ChunkRead {
            path: path.clone(),
            message: "EOF while parsing a list at line 1 column 40".into(),
        },
    );
    assert_eq!(
        ledger.entries(),
        [ErrorEntry {
            source: path,
            stage: Stage::ChunkRead,
            message: "EOF while parsing a list at line 1 column 40".into(),
        }]
    );
}

#[test]
fn test_ledger_ignores_write_errors() {
    let ledger = ErrorLedger::new();
    let path = PathBuf::from("out/users_000.json");
    ledger.record(
        &path,
        &PipelineError::Write {
            path: path.clone(),
            source: std::io::Error::other("disk full"),
        },
    );
    assert!(ledger.is_empty());
}

#[test]
fn test_ledger_is_shared_between_clones() {
    let ledger = ErrorLedger::new();
    let other = ledger.clone();
    std::thread::scope(|s| {
        for i in 0..8 {
            let other = other.clone();
            s.spawn(move || {
                other.push(PathBuf::from(format!("f{i}.json")), Stage::Read, "x".into())
            });
        }
    });
    assert_eq!(ledger.entries().len(), 8);
}

#[test]
fn test_error_entry_display() {
    let entry = ErrorEntry {
        source: PathBuf::from("in/b.json"),
        stage: Stage::Transform,
        message: "expected a JSON object, found null".into(),
    };
    assert_eq!(
        entry.to_string(),
        "in/b.json: transform error: expected a JSON object, found null"
    );
}

// --- option layering ---

#[test]
fn test_settings_file_then_flags() {
    let input = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join(".rechunk.toml"),
        "[settings]\nbatch_size = 10\nprefix = \"groups\"\norder = \"completion\"\n",
    )
    .unwrap();
    let dir = input.path().to_string_lossy().into_owned();
    let cli = Cli::parse_from(["rechunk", dir.as_str(), "out", "-b", "7"]);

    let opts = build_opts(&cli).unwrap();

    assert_eq!(opts.batch_size, 7);
    assert_eq!(opts.prefix, "groups");
    assert_eq!(opts.order, OutputOrder::Completion);
    assert_eq!(opts.output_dir, PathBuf::from("out"));
    assert_eq!(opts.chunk_size, 100);
}

#[test]
fn test_malformed_settings_file_is_an_error() {
    let input = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join(".rechunk.toml"),
        "[settings]\nbatch_size = \"ten\"\n",
    )
    .unwrap();
    let dir = input.path().to_string_lossy().into_owned();
    let cli = Cli::parse_from(["rechunk", dir.as_str(), "out"]);

    let err = build_opts(&cli).unwrap_err();

    assert!(format!("{err}").contains(".rechunk.toml"));
}

#[test]
fn test_missing_settings_file_uses_defaults() {
    let input = tempfile::tempdir().unwrap();
    let dir = input.path().to_string_lossy().into_owned();
    let cli = Cli::parse_from(["rechunk", dir.as_str()]);

    let opts = build_opts(&cli).unwrap();

    assert_eq!(opts.batch_size, 100);
    assert_eq!(opts.output_dir, PathBuf::from("transformed_users"));
}
