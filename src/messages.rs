//! Leveled diagnostics.
///
/// Grounded on the teacher's `Msg`/`DebugLevel` convention (referenced
/// throughout `internals/*.rs` as `self.msg.error(caller, text, Some(value))`
/// and `self.msg.warning(...)`), rebuilt here because the retrieved copy of
/// the teacher repository was missing the module itself. Every diagnostic
/// still goes through this one place rather than scattered `eprintln!`s, so
/// that `--debug-level` has something to gate.
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Error,
    Warning,
    Info,
    Debug,
}

#[derive(Debug, Clone)]
pub struct Msg {
    level: DebugLevel,
}

impl Msg {
    pub fn new() -> Msg {
        Msg {
            level: DebugLevel::Warning,
        }
    }

    pub fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
    }

    pub fn get_level(&self) -> DebugLevel {
        self.level
    }

    /// error ( -- ) always printed: the system is about to abort.
    pub fn error<T: Debug>(&self, caller: &str, text: &str, detail: Option<T>) {
        self.emit(DebugLevel::Error, caller, text, detail);
    }

    /// warning ( -- ) printed unless the level has been lowered below Warning.
    pub fn warning<T: Debug>(&self, caller: &str, text: &str, detail: Option<T>) {
        if self.level >= DebugLevel::Warning {
            self.emit(DebugLevel::Warning, caller, text, detail);
        }
    }

    pub fn info<T: Debug>(&self, caller: &str, text: &str, detail: Option<T>) {
        if self.level >= DebugLevel::Info {
            self.emit(DebugLevel::Info, caller, text, detail);
        }
    }

    pub fn debug<T: Debug>(&self, caller: &str, text: &str, detail: Option<T>) {
        if self.level >= DebugLevel::Debug {
            self.emit(DebugLevel::Debug, caller, text, detail);
        }
    }

    fn emit<T: Debug>(&self, level: DebugLevel, caller: &str, text: &str, detail: Option<T>) {
        match detail {
            Some(d) => eprintln!("[{:?}] {}: {} ({:?})", level, caller, text, d),
            None => eprintln!("[{:?}] {}: {}", level, caller, text),
        }
    }
}

impl Default for Msg {
    fn default() -> Msg {
        Msg::new()
    }
}
