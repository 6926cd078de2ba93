//! RecordStream decoding, chunking and chunk transforms.

use rechunk::pipeline::{ChunkProcessor, RecordStream, StreamOpts, build_chunk_pool, next_chunk};
use rechunk::{PipelineError, Record, Stage, Transform, TransformError, UserTransform};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn odata(context: &str, ids: std::ops::Range<usize>) -> String {
    let users: Vec<_> = ids.map(|i| json!({ "id": format!("u{i}") })).collect();
    json!({ "@odata.context": context, "value": users }).to_string()
}

fn open(path: &Path) -> RecordStream {
    RecordStream::open(path, &StreamOpts::default()).unwrap()
}

// --- RecordStream ---

#[test]
fn test_odata_object_yields_hint_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", &odata("$metadata#users", 0..5));
    let stream = open(&path);
    assert_eq!(stream.hint(), Some("$metadata#users"));
    let ids: Vec<Record> = stream.map(|r| r.unwrap()["id"].clone()).collect();
    assert_eq!(ids, ["u0", "u1", "u2", "u3", "u4"]);
}

#[test]
fn test_bare_array_has_no_hint() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", r#"[{"id": 1}, {"id": 2}]"#);
    let stream = open(&path);
    assert_eq!(stream.hint(), None);
    assert_eq!(stream.count(), 2);
}

#[test]
fn test_hint_after_records_is_not_seen() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "a.json",
        r#"{"value": [{"id": 1}], "@odata.context": "$metadata#users"}"#,
    );
    let stream = open(&path);
    assert_eq!(stream.hint(), None);
    assert_eq!(stream.count(), 1);
}

#[test]
fn test_other_keys_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "a.json",
        r#"{"@odata.nextLink": "https://x", "@odata.context": "ctx", "extra": {"deep": [1, 2]}, "value": [{"id": 1}]}"#,
    );
    let stream = open(&path);
    assert_eq!(stream.hint(), Some("ctx"));
    assert_eq!(stream.count(), 1);
}

#[test]
fn test_object_without_records_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", r#"{"@odata.context": "ctx"}"#);
    let mut stream = open(&path);
    assert!(stream.next().is_none());
}

#[test]
fn test_null_records_field_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", r#"{"value": null}"#);
    assert_eq!(open(&path).count(), 0);
}

#[test]
fn test_custom_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "a.json",
        r#"{"kind": "groups", "items": [{"id": 1}, {"id": 2}, {"id": 3}]}"#,
    );
    let opts = StreamOpts {
        records_field: "items".into(),
        hint_field: "kind".into(),
        channel_cap: 1,
    };
    let stream = RecordStream::open(&path, &opts).unwrap();
    assert_eq!(stream.hint(), Some("groups"));
    assert_eq!(stream.count(), 3);
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RecordStream::open(&dir.path().join("nope.json"), &StreamOpts::default())
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Read));
}

#[test]
fn test_garbage_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", "this is not json");
    let err = RecordStream::open(&path, &StreamOpts::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Read { .. }));
}

#[test]
fn test_scalar_document_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", "42");
    let err = RecordStream::open(&path, &StreamOpts::default()).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Read));
}

#[test]
fn test_truncated_array_fails_mid_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "a.json",
        r#"{"@odata.context": "ctx", "value": [{"id": 1}, {"id": 2}, {"id": "#,
    );
    let items: Vec<_> = open(&path).collect();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_ok());
    let err = items[2].as_ref().unwrap_err();
    assert_eq!(err.stage(), Some(Stage::ChunkRead));
}

#[test]
fn test_trailing_garbage_fails_after_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", r#"[{"id": 1}] trailing"#);
    let items: Vec<_> = open(&path).collect();
    assert!(items[0].is_ok());
    assert!(matches!(items.last(), Some(Err(PipelineError::ChunkRead { .. }))));
}

#[test]
fn test_dropping_stream_early_does_not_hang() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", &odata("ctx", 0..5_000));
    let opts = StreamOpts {
        channel_cap: 4,
        ..StreamOpts::default()
    };
    let mut stream = RecordStream::open(&path, &opts).unwrap();
    assert!(stream.next().unwrap().is_ok());
    drop(stream);
}

// --- chunking ---

#[test]
fn test_next_chunk_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.json", &odata("ctx", 0..250));
    let mut stream = open(&path);
    let mut sizes = Vec::new();
    loop {
        let chunk = next_chunk(&mut stream, 100).unwrap();
        if chunk.is_empty() {
            break;
        }
        sizes.push(chunk.len());
    }
    assert_eq!(sizes, [100, 100, 50]);
}

#[test]
fn test_next_chunk_error_fails_chunk() {
    let mut items = vec![
        Ok(json!({"id": 1})),
        Err(PipelineError::ChunkRead {
            path: PathBuf::from("x.json"),
            message: "eof".into(),
        }),
    ]
    .into_iter();
    let err = next_chunk(&mut items, 10).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::ChunkRead));
}

struct FailOn(i64);

impl Transform for FailOn {
    fn name(&self) -> &str {
        "fail-on"
    }

    fn transform(&self, record: &Record) -> Result<Record, TransformError> {
        if record["id"] == self.0 {
            return Err(TransformError::Custom(format!("bad id {}", self.0)));
        }
        Ok(json!({ "seen": record["id"] }))
    }
}

#[test]
fn test_transform_chunk_keeps_order() {
    let pool = build_chunk_pool(Some(4)).unwrap();
    let processor = ChunkProcessor::new(64, pool.as_ref());
    let chunk: Vec<Record> = (0..64).map(|i| json!({ "id": i })).collect();
    let out = processor
        .transform_chunk(&chunk, &FailOn(-1), Path::new("a.json"))
        .unwrap();
    let seen: Vec<i64> = out.iter().map(|r| r["seen"].as_i64().unwrap()).collect();
    assert_eq!(seen, (0..64).collect::<Vec<_>>());
}

#[test]
fn test_transform_chunk_single_failure_fails_chunk() {
    let processor = ChunkProcessor::new(10, None);
    let chunk: Vec<Record> = (0..10).map(|i| json!({ "id": i })).collect();
    let err = processor
        .transform_chunk(&chunk, &FailOn(7), Path::new("a.json"))
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Transform));
    assert!(err.to_string().contains("a.json"));
}

#[test]
fn test_transform_chunk_with_user_transform() {
    let processor = ChunkProcessor::new(3, None);
    let chunk = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];
    let out = processor
        .transform_chunk(&chunk, &UserTransform, Path::new("a.json"))
        .unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[2]["Id"], "c");
}
