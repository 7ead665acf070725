use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{
    CorruptLine, DeleteOutcome, HistoryRecord, HistoryStore, Listing, SEPARATOR, remove_image,
    validate_identifier, validate_payload,
};
use crate::error::{Result, StudioError};

/// File name of the text log inside the store directory.
pub const LOG_FILE: &str = "qr_data.txt";

/// Split one log line (without its terminator) into a record.
///
/// The identifier ends at the first separator; everything after it is the
/// payload, separators included. Returns `None` when there is no separator
/// or the identifier is empty.
pub fn parse_line(line: &str) -> Option<HistoryRecord> {
    let (identifier, payload) = line.split_once(SEPARATOR)?;
    if identifier.is_empty() {
        return None;
    }
    Some(HistoryRecord::new(identifier, payload))
}

/// Drop a trailing `\n` and then a trailing `\r`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// One raw log line, terminator removed.
enum LogLine<'a> {
    Blank,
    Record(HistoryRecord),
    Corrupt(&'a [u8]),
}

fn classify(raw: &[u8]) -> LogLine<'_> {
    let line = strip_terminator(raw);
    match std::str::from_utf8(line) {
        Ok(text) if text.trim().is_empty() => LogLine::Blank,
        Ok(text) => parse_line(text).map_or(LogLine::Corrupt(line), LogLine::Record),
        Err(_) => LogLine::Corrupt(line),
    }
}

/// Whether the file's last byte is something other than `\n`.
fn ends_unterminated(file: &mut fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// History kept as `identifier||payload` lines in [`LOG_FILE`].
#[derive(Debug, Clone)]
pub struct TextLogStore {
    dir: PathBuf,
    log_path: PathBuf,
}

impl TextLogStore {
    /// Store rooted at `dir`. Nothing is created until the first append.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let log_path = dir.join(LOG_FILE);
        Self { dir, log_path }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Raw log content, or `None` when the log does not exist yet.
    fn read_log(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.log_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StudioError::io("read history log", &self.log_path, e)),
        }
    }

    /// Replace the log atomically: write a sibling temp file, then rename it over the log.
    fn replace_log(&self, content: &[u8]) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| StudioError::io("create temp file in", &self.dir, e))?;
        // Keep the log's permissions across the rename.
        if let Ok(meta) = fs::metadata(&self.log_path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| StudioError::io("set permissions on", tmp.path(), e))?;
        }
        tmp.write_all(content)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StudioError::io("write", tmp.path(), e))?;
        tmp.persist(&self.log_path)
            .map_err(|e| StudioError::io("replace history log", &self.log_path, e.error))?;
        Ok(())
    }
}

impl HistoryStore for TextLogStore {
    fn image_dir(&self) -> &Path {
        &self.dir
    }

    fn append(&self, identifier: &str, payload: &str) -> Result<()> {
        validate_identifier(identifier)?;
        validate_payload(payload)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| StudioError::io("open history log", &self.log_path, e))?;
        // A hand-edited log may lack its final newline; never glue onto it.
        let lead = if ends_unterminated(&mut file)
            .map_err(|e| StudioError::io("read history log", &self.log_path, e))?
        {
            "\n"
        } else {
            ""
        };
        file.write_all(format!("{lead}{identifier}{SEPARATOR}{payload}\n").as_bytes())
            .map_err(|e| StudioError::io("append to history log", &self.log_path, e))?;
        tracing::debug!(identifier, "history record appended");
        Ok(())
    }

    fn list_all(&self) -> Result<Listing> {
        let Some(content) = self.read_log()? else {
            return Ok(Listing::default());
        };

        let mut listing = Listing::default();
        for (idx, raw) in content.split_inclusive(|&b| b == b'\n').enumerate() {
            match classify(raw) {
                LogLine::Blank => {}
                LogLine::Record(record) => listing.records.push(record),
                LogLine::Corrupt(line) => {
                    tracing::warn!(
                        line_number = idx + 1,
                        log = %self.log_path.display(),
                        "skipping corrupt history line"
                    );
                    listing.corrupt.push(CorruptLine {
                        line_number: idx + 1,
                        content: String::from_utf8_lossy(line).into_owned(),
                    });
                }
            }
        }
        Ok(listing)
    }

    fn delete(&self, identifier: &str) -> Result<DeleteOutcome> {
        let image_path = self.image_path(identifier)?;

        // Log first, image second: an interrupted delete leaves an orphan
        // image rather than a record pointing at nothing.
        let mut records_removed = 0;
        if let Some(content) = self.read_log()? {
            let mut kept = Vec::with_capacity(content.len() + 1);
            for raw in content.split_inclusive(|&b| b == b'\n') {
                let matches = matches!(
                    classify(raw),
                    LogLine::Record(record) if record.identifier == identifier
                );
                if matches {
                    records_removed += 1;
                } else {
                    kept.extend_from_slice(raw);
                    if !raw.ends_with(b"\n") {
                        kept.push(b'\n');
                    }
                }
            }
            if records_removed > 0 {
                self.replace_log(&kept)?;
            }
        }

        let image_removed = remove_image(&image_path)?;
        tracing::debug!(identifier, records_removed, image_removed, "history record deleted");
        Ok(DeleteOutcome {
            records_removed,
            image_removed,
        })
    }
}
