//! Data-stack shuffling and return-stack access primitives.
//!
//! Grounded on the teacher's `f_dup`/`f_drop`/`f_swap`/`f_over`/`f_rot`/
//! `f_to_r`/`f_r_from` (`internals/builtin.rs`), translated onto `Stack`'s
//! checked `push`/`pop`/`peek`/`roll` rather than raw array indexing.

use crate::error::ForthError;
use crate::interpreter::Forth;
use crate::kernel::CELL_SIZE;

/// `dup` ( a -- a a )
pub fn dup(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.top()?;
    forth.push(a)
}

/// `drop` ( a -- )
pub fn drop_(forth: &mut Forth) -> Result<(), ForthError> {
    forth.pop()?;
    Ok(())
}

/// `swap` ( a b -- b a )
pub fn swap(forth: &mut Forth) -> Result<(), ForthError> {
    let b = forth.pop()?;
    let a = forth.pop()?;
    forth.push(b)?;
    forth.push(a)
}

/// `over` ( a b -- a b a )
pub fn over(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.kernel.stack.peek(1)?;
    forth.push(a)
}

/// `rot` ( a b c -- b c a )
pub fn rot(forth: &mut Forth) -> Result<(), ForthError> {
    let c = forth.pop()?;
    let b = forth.pop()?;
    let a = forth.pop()?;
    forth.push(b)?;
    forth.push(c)?;
    forth.push(a)
}

/// `pick` ( ... n -- ... value ) copy the nth item down (0 = top, after
/// popping `n` itself) without disturbing the rest of the stack.
pub fn pick(forth: &mut Forth) -> Result<(), ForthError> {
    let n = forth.pop()? as usize;
    let v = forth.kernel.stack.peek(n)?;
    forth.push(v)
}

/// `roll` ( ... n -- ... value ) remove the nth item down and push it on
/// top, shifting everything above it down by one.
pub fn roll(forth: &mut Forth) -> Result<(), ForthError> {
    let n = forth.pop()? as usize;
    forth.kernel.stack.roll(n)
}

/// `>r` ( a -- ) ( R: -- a ) moves a cell to the return stack. Shares the
/// same return stack the inner interpreter uses for `docol`/`exit`
/// bookkeeping - a definition using `>r` must balance it with `r>` or
/// `r@`+`drop` before it returns, or it will pop the wrong address.
pub fn to_r(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.pop()?;
    forth.kernel.return_stack.push(a)
}

/// `r>` ( -- a ) ( R: a -- )
pub fn r_from(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.kernel.return_stack.pop()?;
    forth.push(a)
}

/// `r@` ( -- a ) ( R: a -- a ) copy without removing.
pub fn r_fetch(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.kernel.return_stack.top()?;
    forth.push(a)
}

/// `cell` ( -- n ) pushes the size in bytes of one cell, so `startup.f` can
/// compute body offsets without a magic number baked into the source.
pub fn cell(forth: &mut Forth) -> Result<(), ForthError> {
    forth.push(CELL_SIZE as i64)
}
