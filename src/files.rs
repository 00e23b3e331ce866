//! Input-stream abstraction over stdin and plain files.
//!
//! Grounded on the teacher's root `files.rs`: a tiny `FileHandle` over an
//! `FType` enum, read a line at a time. The teacher's `internals/files.rs`
//! generation adds a `Tui` variant for a ratatui dashboard and a
//! per-character stdin reader; those are out of scope here (see
//! DESIGN.md) - byte-at-a-time reads for `key` go through the tokenizer's
//! own line buffer (`interpreter::outer::next_byte`) instead, so every
//! input source, not just stdin, can supply one.

use std::fs::File;
use std::io::{self, BufReader, BufRead, Write};
use std::path::Path;

use crate::messages::Msg;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileMode {
    RW,
    RO,
    WO,
}

#[derive(Debug)]
pub enum FType {
    Stdin,
    File(File),
    BReader(BufReader<File>),
}

#[derive(Debug)]
pub struct FileHandle {
    pub source: FType,
    pub file_mode: FileMode,
    pub file_size: usize,
    pub file_position: usize,
}

impl FileHandle {
    pub fn stdin() -> FileHandle {
        FileHandle {
            source: FType::Stdin,
            file_mode: FileMode::RO,
            file_size: 0,
            file_position: 0,
        }
    }

    /// Open a file for reading or writing, logging and returning `None` on
    /// failure rather than aborting the process (the caller turns a `None`
    /// into `ForthError::BootstrapFailed` or a file-word failure flag).
    pub fn open(path: &Path, mode: FileMode, msg: &Msg) -> Option<FileHandle> {
        let size = path.metadata().map(|m| m.len() as usize).unwrap_or(0);
        match File::open(path) {
            Ok(file) => {
                let source = match mode {
                    FileMode::RO => FType::BReader(BufReader::new(file)),
                    FileMode::RW | FileMode::WO => FType::File(file),
                };
                Some(FileHandle {
                    source,
                    file_mode: mode,
                    file_size: size,
                    file_position: 0,
                })
            }
            Err(e) => {
                msg.warning("files::open", "unable to open file", Some(e.to_string()));
                None
            }
        }
    }

    /// Read one line, trimming the trailing newline. `None` signals EOF.
    pub fn get_line(&mut self, msg: &Msg) -> Option<String> {
        let mut line = String::new();
        let result = match &mut self.source {
            FType::Stdin => {
                io::stdout().flush().ok();
                io::stdin().read_line(&mut line)
            }
            FType::BReader(br) => br.read_line(&mut line),
            FType::File(_) => {
                msg.warning("get_line", "cannot read from a write-only file", None::<()>);
                return None;
            }
        };
        match result {
            Ok(0) => None,
            Ok(n) => {
                self.file_position += n;
                Some(line.trim_end_matches(['\n', '\r']).to_string())
            }
            Err(e) => {
                msg.error("get_line", "read_line failed", Some(e.to_string()));
                None
            }
        }
    }

    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        match &mut self.source {
            FType::File(f) => f.write_all(text.as_bytes()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn open_missing_file_returns_none() {
        let msg = Msg::new();
        let handle = FileHandle::open(Path::new("/does/not/exist.f"), FileMode::RO, &msg);
        assert!(handle.is_none());
    }

    #[test]
    fn get_line_reads_and_trims_newline() {
        let mut tmp = std::env::temp_dir();
        tmp.push("tforth_test_get_line.f");
        {
            let mut f = File::create(&tmp).unwrap();
            writeln!(f, "dup + .").unwrap();
        }
        let msg = Msg::new();
        let mut handle = FileHandle::open(&tmp, FileMode::RO, &msg).unwrap();
        assert_eq!(handle.get_line(&msg).as_deref(), Some("dup + ."));
        assert_eq!(handle.get_line(&msg), None);
        std::fs::remove_file(&tmp).ok();
    }
}
