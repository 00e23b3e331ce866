//! Structured error type for the interpreter core.
//!
//! The distilled specification notes that a faithful port of the original
//! system would abort the process on every fault. It also names the
//! improvement explicitly: surface a `Result` from every primitive and let
//! the outer interpreter's `quit` loop log and resume. `ForthError` is that
//! result type.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ForthError {
    #[error("{word}: stack underflow (need {needed}, have {available})")]
    StackUnderflow {
        word: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("{word}: stack overflow")]
    StackOverflow { word: &'static str },

    #[error("{word}: return stack underflow")]
    ReturnStackUnderflow { word: &'static str },

    #[error("{word}: return stack overflow")]
    ReturnStackOverflow { word: &'static str },

    #[error("word not recognized: {0}")]
    UnknownWord(String),

    #[error("dictionary arena is full")]
    DictionaryFull,

    #[error("{word}: address out of range ({addr})")]
    AddressOutOfRange { word: &'static str, addr: usize },

    #[error("could not open bootstrap script {path}: {reason}")]
    BootstrapFailed { path: String, reason: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{word}: value {value} does not fit in a byte")]
    NotAByte { word: &'static str, value: i64 },

    #[error("control stack underflow in {word}")]
    ControlStackUnderflow { word: &'static str },

    #[error("{word}: expected a token but the input stream ended")]
    UnexpectedEndOfInput { word: &'static str },
}
