use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{LexideckError, Result};
use crate::services::api::TranslationFailure;

const INPUT_COLUMN: &str = "word_to_translate";
const HISTORY_COLUMN: &str = "translated_words";

/// Reads at most `limit` words from the input list, in file order.
pub fn read_input_words(path: &Path, limit: usize) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(LexideckError::InputNotFound(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(LexideckError::EmptyInput(path.to_path_buf()));
    }

    let column = headers
        .iter()
        .position(|h| h == INPUT_COLUMN)
        .ok_or_else(|| LexideckError::MissingColumn {
            column: INPUT_COLUMN.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut words = Vec::new();
    for record in reader.records() {
        if words.len() == limit {
            break;
        }
        let record = record?;
        if let Some(word) = record.get(column) {
            words.push(word.to_string());
        }
    }

    Ok(words)
}

/// Appends failure records to the errors file. The header row is written
/// only when the file is created.
pub fn append_errors(failures: &[TranslationFailure], path: &Path) -> Result<()> {
    if failures.is_empty() {
        return Err(LexideckError::EmptyWrite);
    }

    let existed = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if !existed {
        writer.write_record(["word", "error"])?;
    }

    for failure in failures {
        writer.write_record([failure.word.as_str(), failure.error.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Appends successfully translated words to the history file.
pub fn append_history(words: &[String], path: &Path) -> Result<()> {
    if words.is_empty() {
        return Err(LexideckError::EmptyWrite);
    }

    let existed = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if !existed {
        writer.write_record([HISTORY_COLUMN])?;
    }

    for word in words {
        writer.write_record([word.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Rewrites the input list with the given words removed, header intact
/// and remaining order preserved. A word that is not present is silently
/// skipped.
pub fn remove_words(words: &[String], path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?.clone();

    let mut remaining: Vec<String> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(word) = record.get(0) {
            if !words.iter().any(|w| w == word) {
                remaining.push(word.to_string());
            }
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(fs::File::create(path)?);
    writer.write_record(&header)?;
    for word in remaining {
        writer.write_record([word.as_str()])?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn failure(word: &str, error: &str) -> TranslationFailure {
        TranslationFailure {
            word: word.to_string(),
            error: error.to_string(),
        }
    }

    #[test]
    fn reads_words_up_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_words.csv");
        fs::write(&path, "word_to_translate\nchat\ndog\n").unwrap();

        assert_eq!(read_input_words(&path, 10).unwrap(), vec!["chat", "dog"]);
        assert_eq!(read_input_words(&path, 1).unwrap(), vec!["chat"]);
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        assert!(matches!(
            read_input_words(&path, 10),
            Err(LexideckError::InputNotFound(_))
        ));
    }

    #[test]
    fn empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_words.csv");
        fs::write(&path, "").unwrap();

        assert!(matches!(
            read_input_words(&path, 10),
            Err(LexideckError::EmptyInput(_))
        ));
    }

    #[test]
    fn missing_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_words.csv");
        fs::write(&path, "some_other_column\nchat\n").unwrap();

        match read_input_words(&path, 10) {
            Err(LexideckError::MissingColumn { column, .. }) => {
                assert_eq!(column, "word_to_translate");
            }
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn empty_error_batch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.csv");

        assert!(matches!(
            append_errors(&[], &path),
            Err(LexideckError::EmptyWrite)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn error_header_is_written_once_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.csv");

        let batch = vec![failure("chat", "500 error"), failure("dog", "timeout")];
        append_errors(&batch, &path).unwrap();
        append_errors(&batch, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "word,error",
                "chat,500 error",
                "dog,timeout",
                "chat,500 error",
                "dog,timeout",
            ]
        );
    }

    #[test]
    fn empty_history_batch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        assert!(matches!(
            append_history(&[], &path),
            Err(LexideckError::EmptyWrite)
        ));
    }

    #[test]
    fn history_appends_under_a_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        append_history(&["chat".to_string()], &path).unwrap();
        append_history(&["dog".to_string()], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["translated_words", "chat", "dog"]);
    }

    #[test]
    fn removes_only_the_given_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_words.csv");
        fs::write(&path, "word_to_translate\napple\nbanana\ncherry\n").unwrap();

        remove_words(&["banana".to_string()], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["word_to_translate", "apple", "cherry"]);
    }

    #[test]
    fn removing_absent_words_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input_words.csv");
        fs::write(&path, "word_to_translate\napple\ncherry\n").unwrap();

        remove_words(&["banana".to_string()], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["word_to_translate", "apple", "cherry"]);
    }
}
