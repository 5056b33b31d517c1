//! Line-oriented reading of fixed-width extracts.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// One non-blank physical line, terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// 1-based line number in the source.
    pub line_number: u64,
    pub text: String,
}

impl SourceRecord {
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Iterator over the records of a fixed-width source.
///
/// Blank lines (empty or whitespace only) are skipped and counted. `\n` and
/// `\r\n` terminators are stripped; nothing else is. A line that is not
/// UTF-8 or contains a NUL byte makes the whole source malformed, and the
/// iterator stops after yielding that error.
pub struct RecordReader<R> {
    inner: R,
    path: PathBuf,
    line: u64,
    blank_lines: u64,
    buf: Vec<u8>,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| IngestError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a reader. `path` names the source in errors.
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            line: 0,
            blank_lines: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blank lines skipped so far.
    pub fn blank_lines(&self) -> u64 {
        self.blank_lines
    }

    fn malformed(&self, reason: String) -> IngestError {
        IngestError::MalformedSource {
            path: self.path.clone(),
            line: self.line,
            reason,
        }
    }

    fn next_record(&mut self) -> Result<Option<SourceRecord>> {
        loop {
            self.buf.clear();
            let read = self
                .inner
                .read_until(b'\n', &mut self.buf)
                .map_err(|source| IngestError::SourceUnavailable {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line += 1;

            let mut line = self.buf.as_slice();
            if let Some(rest) = line.strip_suffix(b"\n") {
                line = rest;
                if let Some(rest) = line.strip_suffix(b"\r") {
                    line = rest;
                }
            }

            if let Some(offset) = line.iter().position(|&byte| byte == 0) {
                return Err(self.malformed(format!("NUL byte at offset {offset}")));
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                self.blank_lines += 1;
                continue;
            }
            let text = match std::str::from_utf8(line) {
                Ok(text) => text.to_string(),
                Err(err) => {
                    let offset = err.valid_up_to();
                    return Err(self.malformed(format!("invalid UTF-8 at offset {offset}")));
                }
            };
            return Ok(Some(SourceRecord {
                line_number: self.line,
                text,
            }));
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn read_all(input: &[u8]) -> (Vec<Result<SourceRecord>>, u64) {
        let mut reader = RecordReader::new(Cursor::new(input.to_vec()), "input.txt");
        let records: Vec<_> = reader.by_ref().collect();
        (records, reader.blank_lines())
    }

    #[test]
    fn test_strips_terminators_and_skips_blank_lines() {
        let (records, blanks) = read_all(b"27 1\r\n\n   \r\n55 2\n27 3");
        let records: Vec<SourceRecord> = records.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(blanks, 2);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].text, "27 1");
        assert_eq!(records[1].line_number, 4);
        assert_eq!(records[2].text, "27 3");
    }

    #[test]
    fn test_trailing_spaces_are_kept() {
        let (records, _) = read_all(b"27  \n");
        assert_eq!(records[0].as_ref().unwrap().text, "27  ");
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let (records, _) = read_all(b"27 ok\n27 \xff\n27 never\n");
        assert_eq!(records.len(), 2);
        match &records[1] {
            Err(IngestError::MalformedSource { line, reason, .. }) => {
                assert_eq!(*line, 2);
                assert!(reason.contains("UTF-8"), "{reason}");
            }
            other => panic!("expected malformed source, got {other:?}"),
        }
    }

    #[test]
    fn test_nul_byte_is_malformed() {
        let (records, _) = read_all(b"27\x0011\n");
        assert!(matches!(
            records[0],
            Err(IngestError::MalformedSource { line: 1, .. })
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = RecordReader::open(Path::new("/nonexistent/brfss.asc")).err();
        assert!(matches!(err, Some(IngestError::SourceUnavailable { .. })));
    }
}
