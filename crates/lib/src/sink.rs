//! Append-only sink for received frames: one raw frame per line (JSONL).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends frames to a file, one per line. The file is created on the
/// first write and reopened per append.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `frame` and a trailing newline.
    pub fn append(&self, frame: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(frame.as_bytes())?;
        file.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_writes_one_line_per_frame() {
        let path =
            std::env::temp_dir().join(format!("uniscrape-sink-test-{}.jsonl", uuid::Uuid::new_v4()));
        let sink = FileSink::new(&path);
        sink.append(r#"{"a":1}"#).unwrap();
        sink.append(r#"{"b":2}"#).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"a\":1}\n{\"b\":2}\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn path_is_the_configured_one() {
        let sink = FileSink::new("output.jsonl");
        assert_eq!(sink.path(), Path::new("output.jsonl"));
    }
}
