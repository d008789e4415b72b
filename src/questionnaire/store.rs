//! Filesystem-backed questionnaire store
//!
//! All paths are resolved against an explicit root directory. Saves to the same
//! file name are serialized through a per-name lock so a later write always
//! replaces an earlier one completely.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task;

use super::error::{StoreError, ValidationError};
use super::naming::{validate_save_name, ListingMatcher};
use super::title::extract_title;
use crate::logger;

/// One row of the questionnaire listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub file: String,
    pub title: Option<String>,
}

/// A save request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub file: String,
    pub content: Value,
}

impl SaveRequest {
    /// Parse and validate a raw request body. An empty body counts as `{}`.
    pub fn parse(body: &[u8]) -> Result<Self, StoreError> {
        let value: Value = if body.is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(body)?
        };

        let Value::Object(mut fields) = value else {
            return Err(ValidationError::BodyNotObject.into());
        };

        let file = match fields.get("file") {
            None | Some(Value::Null) => return Err(ValidationError::MissingFile.into()),
            Some(Value::String(raw)) => validate_save_name(raw)?.to_string(),
            Some(_) => return Err(ValidationError::FileNotString.into()),
        };

        let content = match fields.remove("content") {
            None => return Err(ValidationError::MissingContent.into()),
            Some(v @ (Value::Object(_) | Value::Array(_))) => v,
            Some(other) => {
                return Err(ValidationError::ContentNotContainer(json_type_name(&other)).into())
            }
        };

        Ok(Self { file, content })
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Encode questionnaire content exactly as it is written to disk
pub fn encode_content(content: &Value) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec_pretty(content)?)
}

type LockTable = Arc<StdMutex<HashMap<String, LockSlot>>>;

struct LockSlot {
    lock: Arc<Mutex<()>>,
    users: usize,
}

fn lock_table(table: &LockTable) -> MutexGuard<'_, HashMap<String, LockSlot>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Claim on one file's write lock.
///
/// The ticket travels with the blocking write, so the lock stays held until
/// the bytes are on disk even when the request future is dropped. Dropping the
/// last ticket for a name removes its table entry.
struct WriteTicket {
    table: LockTable,
    file: String,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl WriteTicket {
    fn new(table: &LockTable, file: &str) -> Self {
        let mut locks = lock_table(table);
        let slot = locks.entry(file.to_string()).or_insert_with(|| LockSlot {
            lock: Arc::new(Mutex::new(())),
            users: 0,
        });
        slot.users += 1;
        let lock = Arc::clone(&slot.lock);
        drop(locks);

        Self {
            table: Arc::clone(table),
            file: file.to_string(),
            lock,
            guard: None,
        }
    }

    async fn acquire(mut self) -> Self {
        self.guard = Some(Arc::clone(&self.lock).lock_owned().await);
        self
    }
}

impl Drop for WriteTicket {
    fn drop(&mut self) {
        let mut locks = lock_table(&self.table);
        if let Some(slot) = locks.get_mut(&self.file) {
            slot.users -= 1;
            if slot.users == 0 {
                locks.remove(&self.file);
            }
        }
        drop(locks);
        // Release the file only after the table is settled
        self.guard.take();
    }
}

pub struct QuestionnaireStore {
    root: PathBuf,
    matcher: ListingMatcher,
    write_locks: LockTable,
}

impl QuestionnaireStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            matcher: ListingMatcher::new(),
            write_locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// List questionnaire files in the root directory, sorted by path.
    ///
    /// Only a failure to scan the directory is an error; unreadable or
    /// malformed files are listed without a title.
    pub async fn list(&self) -> Result<Vec<ListingEntry>, StoreError> {
        let mut dir = fs::read_dir(&self.root).await?;
        let mut matched = BTreeSet::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            if name.to_str().is_some_and(|n| self.matcher.matches(n)) {
                matched.insert(entry.path());
            }
        }

        let mut entries = Vec::with_capacity(matched.len());
        for path in matched {
            let title = match fs::read(&path).await {
                Ok(raw) => extract_title(&raw),
                Err(e) => {
                    logger::log_debug(&format!("Skipping title of '{}': {e}", path.display()));
                    None
                }
            };
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            entries.push(ListingEntry { file, title });
        }
        Ok(entries)
    }

    /// Validate a raw save request body and write its content, returning the saved file name
    pub async fn save(&self, body: &[u8]) -> Result<String, StoreError> {
        let request = SaveRequest::parse(body)?;
        self.write(&request.file, &request.content).await?;
        Ok(request.file)
    }

    /// Overwrite `<root>/<file>` with pretty-printed `content`.
    ///
    /// `file` must already be validated. The write runs on the blocking pool
    /// and owns the per-file lock, so it completes in full even if this
    /// future is cancelled.
    async fn write(&self, file: &str, content: &Value) -> Result<(), StoreError> {
        let encoded = encode_content(content)?;
        let size = encoded.len();
        let path = self.root.join(file);
        let ticket = WriteTicket::new(&self.write_locks, file).acquire().await;

        task::spawn_blocking(move || {
            let result = std::fs::write(&path, &encoded);
            drop(ticket);
            result
        })
        .await
        .map_err(io::Error::other)??;

        logger::log_info(&format!("Saved questionnaire {file} ({size} bytes)"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn store_in(dir: &tempfile::TempDir) -> QuestionnaireStore {
        QuestionnaireStore::new(dir.path().to_path_buf())
    }

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    fn dir_names(dir: &tempfile::TempDir) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_list_malformed_and_valid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("question_bad.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("question_ok.json"), r#"{"title":"Ok"}"#).unwrap();

        let entries = store_in(&dir).list().await.unwrap();
        assert_eq!(
            entries,
            vec![
                ListingEntry {
                    file: "question_bad.json".into(),
                    title: None
                },
                ListingEntry {
                    file: "question_ok.json".into(),
                    title: Some("Ok".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "questions_b.json",
            "question_c.json",
            "question_a.json",
            "questions.json",
            "index.html",
            "question_a.txt",
        ] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }

        let files: Vec<String> = store_in(&dir)
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.file)
            .collect();
        assert_eq!(
            files,
            vec!["question_a.json", "question_c.json", "questions_b.json"]
        );
    }

    #[tokio::test]
    async fn test_list_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuestionnaireStore::new(dir.path().join("gone"));
        assert!(matches!(store.list().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let content = json!({"title": "满意度调查", "questions": [{"id": 1}]});

        let file = store
            .save(&body(&json!({"file": "question_test.json", "content": content})))
            .await
            .unwrap();
        assert_eq!(file, "question_test.json");

        let written = std::fs::read(dir.path().join("question_test.json")).unwrap();
        assert_eq!(written, serde_json::to_vec_pretty(&content).unwrap());
        let text = String::from_utf8(written).unwrap();
        assert!(text.contains("满意度调查"));
        assert!(text.starts_with("{\n  \"title\""));
    }

    #[tokio::test]
    async fn test_save_preserves_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let raw = br#"{"file":"question_order.json","content":{"zeta":1,"alpha":2}}"#;
        store_in(&dir).save(raw).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("question_order.json")).unwrap();
        assert_eq!(text, "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}");
    }

    #[tokio::test]
    async fn test_save_overwrites_completely() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&body(&json!({"file": "question_test.json", "content": {"a": 1}})))
            .await
            .unwrap();
        store
            .save(&body(&json!({"file": "question_test.json", "content": [1, 2, 3]})))
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("question_test.json")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
        assert_eq!(text, "[\n  1,\n  2,\n  3\n]");
    }

    #[tokio::test]
    async fn test_save_trims_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = store_in(&dir)
            .save(&body(&json!({"file": " question_x.json ", "content": []})))
            .await
            .unwrap();
        assert_eq!(file, "question_x.json");
        assert_eq!(dir_names(&dir), vec!["question_x.json"]);
    }

    #[tokio::test]
    async fn test_rejected_saves_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let bad_bodies = [
            body(&json!({"file": "quiz_1.json", "content": {}})),
            body(&json!({"file": "question_1.txt", "content": {}})),
            body(&json!({"file": "../question_escape.json", "content": {}})),
            body(&json!({"file": "question_a/b.json", "content": {}})),
            body(&json!({"file": "question_a\\b.json", "content": {}})),
            body(&json!({"file": "question_1.json", "content": "text"})),
            body(&json!({"file": "question_1.json", "content": 7})),
            body(&json!({"file": "question_1.json", "content": true})),
            body(&json!({"file": "question_1.json", "content": null})),
            body(&json!({"file": "question_1.json"})),
            body(&json!({"content": {}})),
            body(&json!({"file": 12, "content": {}})),
            body(&json!([1, 2])),
            b"{broken".to_vec(),
            Vec::new(),
        ];

        for raw in &bad_bodies {
            assert!(store.save(raw).await.is_err(), "accepted {raw:?}");
        }
        assert!(dir_names(&dir).is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SaveRequest::parse(b""),
            Err(StoreError::Validation(ValidationError::MissingFile))
        ));
        assert!(matches!(
            SaveRequest::parse(b"not json"),
            Err(StoreError::Parse(_))
        ));
        assert!(matches!(
            SaveRequest::parse(br#"{"file":"question_a.json","content":"x"}"#),
            Err(StoreError::Validation(ValidationError::ContentNotContainer(
                "string"
            )))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_saves_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));
        let big: Vec<u32> = (0..5_000).collect();

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let store = Arc::clone(&store);
            let content = json!({"writer": i, "payload": big});
            handles.push(tokio::spawn(async move {
                store
                    .save(&body(&json!({"file": "question_race.json", "content": content})))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let text = std::fs::read_to_string(dir.path().join("question_race.json")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["payload"].as_array().unwrap().len(), 5_000);
        assert!(lock_table(&store.write_locks).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_save_keeps_file_locked_until_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let big: Vec<u64> = (0..500_000).collect();
        let first = body(&json!({"file": "question_cut.json", "content": {"payload": big}}));

        // Dropped before the blocking write can finish
        let _ = tokio::time::timeout(Duration::ZERO, store.save(&first)).await;

        store
            .save(&body(&json!({"file": "question_cut.json", "content": ["final"]})))
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("question_cut.json")).unwrap();
        assert_eq!(text, "[\n  \"final\"\n]");
        assert!(lock_table(&store.write_locks).is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_big_integers_exact() {
        let dir = tempfile::tempdir().unwrap();
        let raw = br#"{"file":"question_big.json","content":{"id":123456789012345678901234567890,"ratio":0.1}}"#;
        store_in(&dir).save(raw).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("question_big.json")).unwrap();
        assert_eq!(
            text,
            "{\n  \"id\": 123456789012345678901234567890,\n  \"ratio\": 0.1\n}"
        );
    }
}
