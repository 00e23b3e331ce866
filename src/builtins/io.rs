//! Character and file-stream primitives: `key`, `emit`, `tell`, `bye`,
//! input-stream switching, and file open/close.
//!
//! Grounded on the teacher's `f_key`/`f_emit`/`f_tell`/`f_bye` and the
//! `reader` stack in `runtime.rs` (`include-file`/`set-input`); reworked
//! against the `Forth.files`/`Forth.input` handle table described in
//! SPEC_FULL.md's I/O section so a stream is a plain integer a Forth
//! program can hold, pass around and compare, the way the original
//! exposes file descriptors.

use std::path::Path;

use crate::error::ForthError;
use crate::files::{FileHandle, FileMode};
use crate::interpreter::{inner, outer, Forth};

/// Read a NUL-terminated string out of the dictionary arena (the layout
/// `tell`'s argument and `open-read-file`'s pathname are both stored in,
/// matching how dictionary entry names are stored).
fn read_c_string(forth: &Forth, addr: usize) -> String {
    let mut end = addr;
    while forth.kernel.byte(end) != 0 {
        end += 1;
    }
    String::from_utf8_lossy(forth.kernel.bytes(addr, end - addr)).into_owned()
}

/// `key` ( -- char ) reads the next raw byte from the active input stream,
/// by way of the tokenizer's own line buffer - so a `( ... )` comment and
/// a following word on the same line see a consistent view of the input,
/// instead of `key` racing ahead of an already-buffered line.
pub fn key(forth: &mut Forth) -> Result<(), ForthError> {
    match outer::next_byte(forth) {
        Some(b) => forth.push(b as i64),
        None => Err(ForthError::UnexpectedEndOfInput { word: "key" }),
    }
}

/// `emit` ( char -- ) writes one byte to stdout.
pub fn emit(forth: &mut Forth) -> Result<(), ForthError> {
    let v = forth.pop()?;
    if !(0..256).contains(&v) {
        return Err(ForthError::NotAByte {
            word: "emit",
            value: v,
        });
    }
    use std::io::Write;
    print!("{}", v as u8 as char);
    std::io::stdout().flush().ok();
    Ok(())
}

/// `tell` ( addr -- ) prints the NUL-terminated string at `addr`.
pub fn tell(forth: &mut Forth) -> Result<(), ForthError> {
    let addr = forth.pop()? as usize;
    let s = read_c_string(forth, addr);
    print!("{}", s);
    use std::io::Write;
    std::io::stdout().flush().ok();
    Ok(())
}

/// `bye` ( -- ) requests that `quit` stop after this token finishes.
pub fn bye(forth: &mut Forth) -> Result<(), ForthError> {
    forth.exit_flag = true;
    Ok(())
}

/// `stdin` ( -- handle ) pushes the handle id that always names stdin.
pub fn stdin_word(forth: &mut Forth) -> Result<(), ForthError> {
    forth.push(0)
}

/// `get-input-stream` ( -- handle ) the handle currently feeding the
/// tokenizer. `forth.input` always has a bottom entry (stdin), so this
/// never runs on an empty stack.
pub fn get_input_stream(forth: &mut Forth) -> Result<(), ForthError> {
    let id = *forth.input.last().expect("input stream stack is never empty");
    forth.push(id as i64)
}

/// `set-input-stream` ( handle -- ) pushes a new source onto the active
/// input stack; exhausting it pops back to the caller automatically (the
/// tokenizer's `refill`), matching `include`-style nesting.
pub fn set_input_stream(forth: &mut Forth) -> Result<(), ForthError> {
    let id = forth.pop()? as usize;
    if forth.files.get(id).map(Option::is_some) != Some(true) {
        return Err(ForthError::AddressOutOfRange {
            word: "set-input-stream",
            addr: id,
        });
    }
    forth.input.push(id);
    Ok(())
}

/// `open-read-file` ( addr -- handle | -1 ) opens the NUL-terminated
/// pathname at `addr` for reading, pushing its new handle id, or `-1` if
/// the open failed (logged via `Msg`, not a hard error - the distilled
/// spec's scenarios expect a Forth-level retry/branch on failure here
/// rather than an aborted session).
pub fn open_read_file(forth: &mut Forth) -> Result<(), ForthError> {
    let addr = forth.pop()? as usize;
    let path = read_c_string(forth, addr);
    match FileHandle::open(Path::new(&path), FileMode::RO, &forth.msg) {
        Some(handle) => {
            let id = forth.files.len();
            forth.files.push(Some(handle));
            forth.push(id as i64)
        }
        None => forth.push(-1),
    }
}

/// `close-file` ( handle -- ) drops the handle, freeing its slot.
pub fn close_file(forth: &mut Forth) -> Result<(), ForthError> {
    let id = forth.pop()? as usize;
    if let Some(slot) = forth.files.get_mut(id) {
        *slot = None;
    }
    Ok(())
}

/// `execute` ( xt -- ) calls the word whose tagged codeword value is on
/// top of the stack - the runtime counterpart to `'`.
pub fn execute(forth: &mut Forth) -> Result<(), ForthError> {
    let xt = forth.pop()? as usize;
    inner::execute(forth, xt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::install_core;

    #[test]
    fn stdin_word_pushes_handle_zero() {
        let mut forth = Forth::new();
        stdin_word(&mut forth).unwrap();
        assert_eq!(forth.pop().unwrap(), 0);
    }

    #[test]
    fn open_missing_file_pushes_negative_one() {
        let mut forth = Forth::new();
        install_core(&mut forth).unwrap();
        let path = "/does/not/exist.f\0";
        let addr = forth.here;
        forth.kernel.write_bytes(addr, path.as_bytes());
        forth.push(addr as i64).unwrap();
        open_read_file(&mut forth).unwrap();
        assert_eq!(forth.pop().unwrap(), -1);
    }

    #[test]
    fn close_file_clears_the_slot() {
        let mut forth = Forth::new();
        forth.files.push(Some(FileHandle::stdin()));
        forth.push(1).unwrap();
        close_file(&mut forth).unwrap();
        assert!(forth.files[1].is_none());
    }

    #[test]
    fn emit_rejects_values_outside_a_byte() {
        let mut forth = Forth::new();
        forth.push(300).unwrap();
        assert!(matches!(emit(&mut forth), Err(ForthError::NotAByte { .. })));
    }
}
