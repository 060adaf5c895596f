//! Reads and writes message documents as JSON files.
//!
//! A message file holds either a single JSON object (one message) or a JSON
//! array of objects (several messages). Files are written pretty-printed so
//! operators can inspect and edit them before requeueing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde_json::Value;

use crate::core::TransferError;

/// Loads the message(s) contained in a JSON file.
///
/// An object loads as one message, an array as many.
pub fn load(path: &Path) -> anyhow::Result<Vec<Value>> {
    tracing::debug!("Getting messages from {}", path.display());

    if !path.is_file() {
        return Err(TransferError::FileNotFound(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;

    let document: Value =
        serde_json::from_str(&content).map_err(|e| TransferError::MalformedDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    match document {
        Value::Array(items) => Ok(items),
        single => Ok(vec![single]),
    }
}

/// Saves messages to a JSON file: a single message as an object, several as
/// an array. Saving zero messages writes nothing and is not an error.
pub fn save(messages: &[Value], path: &Path) -> anyhow::Result<()> {
    if messages.is_empty() {
        tracing::warn!("No messages found!");
        return Ok(());
    }

    tracing::info!("Saving {} message(s) to {}", messages.len(), path.display());

    let document = if messages.len() == 1 {
        messages[0].clone()
    } else {
        Value::Array(messages.to_vec())
    };

    let content = serde_json::to_string_pretty(&document)?;
    fs::write(path, content)
        .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;

    Ok(())
}

/// Lists the entries directly inside a folder. Non-recursive; the order the
/// platform returns entries in is not guaranteed.
pub fn list_directory(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(path)
        .map_err(|e| anyhow!("Failed to read folder {}: {}", path.display(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        files.push(entry?.path());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_missing_file_is_not_found() {
        let error = load(Path::new("blarg.json")).unwrap_err();
        match error.downcast_ref::<TransferError>() {
            Some(TransferError::FileNotFound(path)) => {
                assert_eq!(path, Path::new("blarg.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let error = load(&path).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<TransferError>(),
            Some(TransferError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_load_single_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.json");
        fs::write(&path, r#"{"ValueA": 1629, "ValueB": 1675}"#).unwrap();

        let messages = load(&path).unwrap();
        assert_eq!(messages, vec![json!({"ValueA": 1629, "ValueB": 1675})]);
    }

    #[test]
    fn test_load_array_of_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("many.json");
        fs::write(&path, r#"[{"a": 1}, {"b": 2}]"#).unwrap();

        let messages = load(&path).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], json!({"b": 2}));
    }

    #[test]
    fn test_save_zero_messages_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");

        save(&[], &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_save_one_message_writes_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.json");

        save(&[json!({"a": 1})], &path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"a": 1}));
    }

    #[test]
    fn test_save_several_messages_writes_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("many.json");

        save(&[json!({"a": 1}), json!({"b": 2})], &path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn test_list_directory_returns_direct_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();

        let mut entries = list_directory(dir.path()).unwrap();
        entries.sort();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("a.json"));
        assert!(entries[1].ends_with("b.json"));
    }
}
