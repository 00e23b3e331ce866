//! Registers every primitive with a fresh `Forth`.
//!
//! Grounded on the teacher's `compile_builtins` (`runtime.rs`), which walks
//! a fixed table of `(name, fn)` pairs and installs each one through
//! `add_builtin`/`make_word`. The four reserved ids the inner interpreter
//! special-cases (`lit`/`branch`/`0branch`/`exit`) are installed first so
//! their ids match `interpreter::{LIT_ID, BRANCH_ID, BRANCH0_ID, EXIT_ID}`.

pub mod arithmetic;
pub mod compiler;
pub mod io;
pub mod stack;

use crate::error::ForthError;
use crate::interpreter::Forth;

/// Install the full primitive set, in the order the reserved opcode ids
/// require. Safe to call exactly once per `Forth`.
pub fn install_core(forth: &mut Forth) -> Result<(), ForthError> {
    // Reserved ids 0-3: `lit`/`branch`/`0branch` carry their operand inline
    // in a compiled body and are never meant to be called as ordinary
    // primitives; `exit` pops the return stack. All four are genuine
    // no-ops if invoked directly at the top level (see inner::call_primitive).
    forth.install("lit", false, |_| Ok(()), "inline literal marker")?;
    forth.install("branch", false, |_| Ok(()), "unconditional inline branch")?;
    forth.install("0branch", false, |_| Ok(()), "branch if top of stack is zero")?;
    forth.install("exit", false, |_| Ok(()), "return from the current definition")?;

    forth.install(":", false, compiler::colon, "begin a colon definition")?;
    forth.install(";", true, compiler::semicolon, "end a colon definition")?;
    forth.install(",", false, compiler::comma, "append a cell to the dictionary")?;
    forth.install(
        "'",
        true,
        compiler::tick,
        "push (or, while compiling, embed) the next word's execution token",
    )?;
    forth.install(
        "[']",
        true,
        compiler::bracket_tick,
        "compile the next word's execution token as a literal",
    )?;
    forth.install("[", true, compiler::lbracket, "drop to interpret mode while compiling")?;
    forth.install("]", false, compiler::rbracket, "return to compile mode")?;
    forth.install("immediate", false, compiler::immediate, "mark the latest word immediate")?;
    forth.install("here", false, compiler::here, "push the dictionary write cursor")?;
    forth.install("latest", false, compiler::latest, "push the most recent entry's offset")?;
    forth.install("@", false, compiler::fetch, "read a cell from the dictionary arena")?;
    forth.install("!", false, compiler::store, "write a cell to the dictionary arena")?;
    forth.install("find-word", false, compiler::find_word, "look up a word by name")?;
    forth.install("code-word", false, compiler::code_word, "push an entry's codeword address")?;

    forth.install("+", false, arithmetic::add, "add, wrapping on overflow")?;
    forth.install("-", false, arithmetic::sub, "subtract, wrapping on overflow")?;
    forth.install("*", false, arithmetic::mul, "multiply, wrapping on overflow")?;
    forth.install("divmod", false, arithmetic::divmod, "quotient then remainder")?;
    forth.install("=", false, arithmetic::eq, "equality, -1/0")?;
    forth.install("<", false, arithmetic::lt, "less than, -1/0")?;
    forth.install(">", false, arithmetic::gt, "greater than, -1/0")?;
    forth.install("<=", false, arithmetic::le, "less than or equal, -1/0")?;
    forth.install(">=", false, arithmetic::ge, "greater than or equal, -1/0")?;
    forth.install("0=", false, arithmetic::zero_eq, "true if top is zero")?;
    forth.install("0<", false, arithmetic::zero_lt, "true if top is negative")?;
    forth.install("not", false, arithmetic::not, "logical not")?;
    forth.install("and", false, arithmetic::and, "logical and")?;
    forth.install("or", false, arithmetic::or, "logical or")?;

    forth.install("dup", false, stack::dup, "duplicate the top cell")?;
    forth.install("drop", false, stack::drop_, "discard the top cell")?;
    forth.install("swap", false, stack::swap, "swap the top two cells")?;
    forth.install("over", false, stack::over, "copy the second cell to the top")?;
    forth.install("rot", false, stack::rot, "rotate the top three cells")?;
    forth.install("pick", false, stack::pick, "copy the nth cell to the top")?;
    forth.install("roll", false, stack::roll, "move the nth cell to the top")?;
    forth.install(">r", false, stack::to_r, "move a cell to the return stack")?;
    forth.install("r>", false, stack::r_from, "move a cell off the return stack")?;
    forth.install("r@", false, stack::r_fetch, "copy the top of the return stack")?;
    forth.install("cell", false, stack::cell, "push the size of one cell")?;

    forth.install("key", false, io::key, "read the next raw input byte")?;
    forth.install("emit", false, io::emit, "write a byte to stdout")?;
    forth.install("tell", false, io::tell, "print a NUL-terminated string")?;
    forth.install("bye", false, io::bye, "end the interpreter session")?;
    forth.install("stdin", false, io::stdin_word, "push the stdin stream handle")?;
    forth.install(
        "get-input-stream",
        false,
        io::get_input_stream,
        "push the active input stream handle",
    )?;
    forth.install(
        "set-input-stream",
        false,
        io::set_input_stream,
        "switch the tokenizer to a new input stream",
    )?;
    forth.install(
        "open-read-file",
        false,
        io::open_read_file,
        "open a file by pathname for reading",
    )?;
    forth.install("close-file", false, io::close_file, "close a file stream")?;
    forth.install("execute", false, io::execute, "call the execution token on top of the stack")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{BRANCH0_ID, BRANCH_ID, EXIT_ID, LIT_ID};

    #[test]
    fn reserved_opcodes_get_fixed_ids() {
        let mut forth = Forth::new();
        install_core(&mut forth).unwrap();
        assert_eq!(
            crate::dictionary::codeword(&forth.kernel, forth.find("lit").unwrap()),
            crate::dictionary::Codeword::Primitive(LIT_ID)
        );
        assert_eq!(
            crate::dictionary::codeword(&forth.kernel, forth.find("branch").unwrap()),
            crate::dictionary::Codeword::Primitive(BRANCH_ID)
        );
        assert_eq!(
            crate::dictionary::codeword(&forth.kernel, forth.find("0branch").unwrap()),
            crate::dictionary::Codeword::Primitive(BRANCH0_ID)
        );
        assert_eq!(
            crate::dictionary::codeword(&forth.kernel, forth.find("exit").unwrap()),
            crate::dictionary::Codeword::Primitive(EXIT_ID)
        );
    }

    #[test]
    fn every_primitive_is_findable_by_name() {
        let mut forth = Forth::new();
        install_core(&mut forth).unwrap();
        for name in ["dup", "+", "key", ":", "[']", "divmod", "execute"] {
            assert!(forth.find(name).is_some(), "missing primitive {name}");
        }
    }
}
