//! The outer interpreter: tokenizer, number parser, and the REPL loop.
//!
//! Grounded on the teacher's `f_eval`/`f_d_compile`/`f_d_interpret`/
//! `f_parse_to`/`f_quit` (`internals/compiler.rs`), which read a token,
//! decide number-vs-word, and dispatch by compile mode and the immediate
//! flag. The teacher keeps the text input buffer as cells in the shared
//! heap, addressed through `tib_ptr`/`tib_in_ptr`/`#tib`; this rework keeps
//! it as a plain `String` + cursor on `Forth`, refilled from the active
//! input stream when exhausted.

use crate::dictionary;
use crate::error::ForthError;
use crate::interpreter::{inner, Forth, Mode};
use crate::kernel::{PAD_SIZE, PAD_START};

/// Skip whitespace and `#`-to-end-of-line comments, then return the next
/// token, refilling the line buffer from the input stream stack as needed.
/// Returns `None` only when every input source (including stdin) is
/// exhausted. Equivalent to `next_token_above(forth, 0)` - see that
/// function for what the floor protects.
pub fn next_token(forth: &mut Forth) -> Option<String> {
    next_token_above(forth, 0)
}

/// As `next_token`, but refilling never descends below `floor` entries on
/// the input stack - used by `run_until` so a bootstrap script's own EOF
/// doesn't fall through to read (and block on) stdin underneath it.
fn next_token_above(forth: &mut Forth, floor: usize) -> Option<String> {
    loop {
        let bytes = forth.line_buf.as_bytes();
        while forth.line_pos < bytes.len() && bytes[forth.line_pos].is_ascii_whitespace() {
            forth.line_pos += 1;
        }
        if forth.line_pos < bytes.len() && bytes[forth.line_pos] == b'#' {
            forth.line_pos = bytes.len();
        }
        if forth.line_pos >= bytes.len() {
            if !refill(forth, floor) {
                return None;
            }
            continue;
        }
        let start = forth.line_pos;
        let bytes = forth.line_buf.as_bytes();
        let mut end = start;
        while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        let token = forth.line_buf[start..end].to_string();
        forth.line_pos = end;
        write_pad(forth, &token);
        return Some(token);
    }
}

/// Load the next line into `line_buf`, popping exhausted nested input
/// streams (matching the teacher's `reader` stack popping a finished
/// `include-file` back to its caller). Never reads or pops the stream at
/// or below `floor` entries - once the stack has been trimmed back down
/// to `floor`, the stream underneath (e.g. stdin, while a `--script` file
/// is waiting to be installed) is left untouched and this returns `false`
/// without ever calling `get_line` on it. The bottom-most entry (index 0,
/// always stdin) is additionally never popped off even when `floor` is 0,
/// so `forth.input` is never left empty.
fn refill(forth: &mut Forth, floor: usize) -> bool {
    let protected = floor.max(1);
    loop {
        if forth.input.len() <= floor {
            return false;
        }
        let handle_id = *forth.input.last().expect("checked non-empty above");
        let line = match forth.files.get_mut(handle_id).and_then(|slot| slot.as_mut()) {
            Some(handle) => handle.get_line(&forth.msg),
            None => None,
        };
        match line {
            Some(line) => {
                forth.line_buf = line;
                forth.line_pos = 0;
                return true;
            }
            None => {
                if forth.input.len() > protected {
                    forth.input.pop();
                    continue;
                }
                return false;
            }
        }
    }
}

/// Whether the tokenizer has consumed the whole current line - used to
/// decide when to print the `ok` prompt in interactive mode.
pub fn at_end_of_line(forth: &Forth) -> bool {
    forth.line_pos >= forth.line_buf.len()
}

/// Read the next raw byte from the input stream, sharing the tokenizer's
/// own line buffer and refill logic rather than reading the underlying
/// file a second time. `( ... )` block comments are defined in
/// `startup.f` against this primitive (see the distilled spec's Open
/// Question about unifying comment handling in one place) - they must see
/// every byte the tokenizer would otherwise skip past, including bytes in
/// a line already partially consumed by `word`.
pub fn next_byte(forth: &mut Forth) -> Option<u8> {
    loop {
        if forth.line_pos < forth.line_buf.len() {
            let b = forth.line_buf.as_bytes()[forth.line_pos];
            forth.line_pos += 1;
            return Some(b);
        }
        if !refill(forth, 0) {
            return None;
        }
        // `get_line` trims the newline; splice one back in so a
        // multi-line comment's counter still walks over a line boundary
        // rather than silently gluing two lines together.
        forth.line_buf.push('\n');
    }
}

fn write_pad(forth: &mut Forth, token: &str) {
    let bytes = token.as_bytes();
    let len = bytes.len().min(PAD_SIZE - 1);
    forth.kernel.write_bytes(PAD_START, &bytes[..len]);
    forth.kernel.set_byte(PAD_START + len, 0);
}

/// A token is a number iff non-empty, optionally `-`-prefixed, and
/// otherwise all decimal digits - no other bases, no overflow check
/// (wraps, per SPEC_FULL.md section 9).
pub fn parse_number(token: &str) -> Option<i64> {
    if token.is_empty() {
        return None;
    }
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut value: i64 = 0;
    for b in digits.bytes() {
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i64);
    }
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Append a cell to the definition under construction (`,`'s behavior,
/// shared by the compiler primitives below).
pub fn comma(forth: &mut Forth, value: i64) -> Result<(), ForthError> {
    if forth.here + crate::kernel::CELL_SIZE > forth.kernel.arena_len() {
        return Err(ForthError::DictionaryFull);
    }
    forth.kernel.set_cell(forth.here, value);
    forth.here += crate::kernel::CELL_SIZE;
    Ok(())
}

pub(crate) fn compile_literal(forth: &mut Forth, n: i64) -> Result<(), ForthError> {
    let lit_entry = forth
        .find("lit")
        .ok_or(ForthError::UnknownWord("lit".to_string()))?;
    comma(forth, inner::codeword_value_for(forth, lit_entry))?;
    comma(forth, n)
}

/// Number-parse-first, then dictionary lookup, per spec.md section 4.6: a
/// token that happens to both parse as a number and name a defined word
/// (e.g. after `: 0 ... ;`) is a number.
fn interpret_token(forth: &mut Forth, token: &str) -> Result<(), ForthError> {
    if let Some(n) = parse_number(token) {
        forth.push(n)
    } else if let Some(entry) = forth.find(token) {
        forth.execute_entry(entry)
    } else {
        Err(ForthError::UnknownWord(token.to_string()))
    }
}

fn compile_token(forth: &mut Forth, token: &str) -> Result<(), ForthError> {
    if let Some(n) = parse_number(token) {
        compile_literal(forth, n)
    } else if let Some(entry) = forth.find(token) {
        if dictionary::is_immediate(&forth.kernel, entry) {
            forth.execute_entry(entry)
        } else {
            let cw = inner::codeword_value_for(forth, entry);
            comma(forth, cw)
        }
    } else {
        Err(ForthError::UnknownWord(token.to_string()))
    }
}

/// Dispatch one token by the current mode (`eval`'s per-token behavior).
pub fn interpret_one(forth: &mut Forth, token: &str) -> Result<(), ForthError> {
    match forth.mode {
        Mode::Normal => interpret_token(forth, token),
        Mode::Compile => compile_token(forth, token),
    }
}

/// Clear both stacks and return to normal mode (teacher's `f_abort`, minus
/// the process-ending panic).
pub fn abort(forth: &mut Forth) {
    forth.kernel.stack.clear();
    forth.kernel.return_stack.clear();
    forth.mode = Mode::Normal;
    forth.defining = None;
}

/// Read and dispatch one token, refilling only above `floor` entries on the
/// input stack (see `next_token_above`). Returns `false` when the input
/// source(s) above `floor` are exhausted and the loop calling this should
/// stop.
fn step(forth: &mut Forth, floor: usize) -> bool {
    match next_token_above(forth, floor) {
        None => false,
        Some(token) => {
            if let Err(e) = interpret_one(forth, &token) {
                forth.msg.error("quit", &e.to_string(), None::<()>);
                abort(forth);
            }
            if forth.input.len() == 1 && at_end_of_line(forth) {
                if forth.show_stack {
                    print!("{:?} ", forth.kernel.stack.as_slice());
                }
                print!("ok ");
                use std::io::Write;
                std::io::stdout().flush().ok();
            }
            true
        }
    }
}

/// `quit`: the outer REPL loop. Reads a token, dispatches it, and on error
/// logs and aborts rather than exiting the process - the error-handling
/// redesign named in SPEC_FULL.md section 7.
pub fn quit(forth: &mut Forth) {
    while !forth.should_exit() && step(forth, 0) {}
}

/// Run until the input stream stack drops back to `floor` entries (e.g. a
/// bootstrap script popping back off to stdin), or every source above
/// `floor` has been exhausted. Used by `main` to finish loading `startup.f`
/// before handing control to an interactive stdin session or a `--script`
/// file - without this, `quit`'s `ok` prompt would print mid-bootstrap,
/// since that check only looks at `input.len() == 1`. Crucially, this never
/// reads from (or blocks on) the stream sitting at or below `floor`: once
/// the stream above it hits EOF, `step`/`refill` stop at the floor instead
/// of falling through to it, so a `--script` file can still be installed by
/// the caller after this returns without first consuming a stray line from
/// whatever sits beneath the bootstrap script.
pub fn run_until(forth: &mut Forth, floor: usize) {
    while !forth.should_exit() && forth.input.len() > floor {
        if !step(forth, floor) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_negative_integers() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("-7"), Some(-7));
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number("dup"), None);
    }

    #[test]
    fn tokenizer_skips_hash_comments_and_whitespace() {
        let mut forth = Forth::new();
        forth.line_buf = "  dup   # trailing comment\n".to_string();
        forth.line_pos = 0;
        assert_eq!(next_token(&mut forth).as_deref(), Some("dup"));
        // input exhausted, no more sources to refill from (stdin would
        // block in a real test run), so further calls would try to read
        // stdin - we stop here having exercised the comment-skip path.
    }

    #[test]
    fn unknown_word_in_interpret_mode_is_reported() {
        let mut forth = Forth::new();
        let err = interpret_token(&mut forth, "nonesuch").unwrap_err();
        assert_eq!(err, ForthError::UnknownWord("nonesuch".to_string()));
    }

    /// spec.md section 4.6 and SPEC_FULL.md section 4.6: number-parse-first,
    /// then dictionary lookup - a token that is both a valid integer and a
    /// defined word is a number, in both modes.
    #[test]
    fn a_number_shadowed_by_a_same_named_word_still_parses_as_a_number_in_normal_mode() {
        let mut forth = Forth::new();
        crate::builtins::install_core(&mut forth).unwrap();
        forth
            .install("0", false, |f| f.push(999), "shadows the number zero")
            .unwrap();
        interpret_token(&mut forth, "0").unwrap();
        assert_eq!(forth.pop().unwrap(), 0);
    }

    #[test]
    fn a_number_shadowed_by_a_same_named_word_still_compiles_as_a_literal() {
        let mut forth = Forth::new();
        crate::builtins::install_core(&mut forth).unwrap();
        forth
            .install("0", false, |f| f.push(999), "shadows the number zero")
            .unwrap();
        forth.mode = Mode::Compile;
        let before = forth.here;
        compile_token(&mut forth, "0").unwrap();
        // compiled as `lit 0`, two cells, not a one-cell reference to the
        // shadowing word.
        assert_eq!(forth.here, before + 2 * crate::kernel::CELL_SIZE);
        assert_eq!(forth.kernel.cell(forth.here - crate::kernel::CELL_SIZE), 0);
    }
}
