//! JSONL I/O and atomic file operations

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append one JSON record as a single line, creating parent directories
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Read the raw, non-blank lines of a JSONL file (missing file = no lines)
pub fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: u32,
        name: String,
    }

    #[test]
    fn test_append_then_read() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("records.jsonl");

        let records = vec![
            TestRecord {
                id: 1,
                name: "Alice".to_string(),
            },
            TestRecord {
                id: 2,
                name: "Bob".to_string(),
            },
        ];
        for record in &records {
            append_jsonl(&path, record).unwrap();
        }

        let read_records: Vec<TestRecord> = read_lines(&path)
            .unwrap()
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records, read_records);
    }

    #[test]
    fn test_blank_lines_dropped_garbage_kept() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("records.jsonl");
        std::fs::write(&path, "{\"id\":1}\nnot json at all\n\n   \n{\"id\":2}\n").unwrap();

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, ["{\"id\":1}", "not json at all", "{\"id\":2}"]);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(read_lines(&temp.path().join("absent.jsonl")).unwrap().is_empty());
    }

    #[test]
    fn test_atomic_write() {
        let temp = tempfile::TempDir::new().unwrap();
        let test_file = temp.path().join("test_atomic.txt");

        let data = b"Hello, world!";
        atomic_write(&test_file, data).unwrap();

        let read_data = std::fs::read(&test_file).unwrap();
        assert_eq!(data, read_data.as_slice());
        assert!(!test_file.with_extension("tmp").exists());
    }
}
