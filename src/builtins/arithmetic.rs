//! Arithmetic, comparison and logic primitives.
//!
//! Grounded on the teacher's `f_plus`/`f_minus`/`f_times`/`f_divmod`/
//! `f_equal`/... (`internals/builtin.rs`), which pop two cells, operate, and
//! push one back. The distilled spec (section 7) calls out two explicit
//! departures from a literal C-style port: arithmetic wraps instead of
//! panicking on overflow, and `divmod`'s zero-divisor case returns
//! `ForthError::DivisionByZero` instead of aborting the process.

use crate::error::ForthError;
use crate::interpreter::Forth;

fn binop(forth: &mut Forth, f: impl FnOnce(i64, i64) -> i64) -> Result<(), ForthError> {
    let b = forth.pop()?;
    let a = forth.pop()?;
    forth.push(f(a, b))
}

/// `+` ( a b -- a+b )
pub fn add(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, i64::wrapping_add)
}

/// `-` ( a b -- a-b )
pub fn sub(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, i64::wrapping_sub)
}

/// `*` ( a b -- a*b )
pub fn mul(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, i64::wrapping_mul)
}

/// `divmod` ( a b -- quotient remainder ), per the distilled spec's worked
/// example (`10 3 divmod` leaves quotient below remainder, remainder on
/// top). Division by zero is a `ForthError`, not a process abort.
pub fn divmod(forth: &mut Forth) -> Result<(), ForthError> {
    let b = forth.pop()?;
    let a = forth.pop()?;
    if b == 0 {
        return Err(ForthError::DivisionByZero);
    }
    forth.push(a.wrapping_div(b))?;
    forth.push(a.wrapping_rem(b))
}

fn flag(v: bool) -> i64 {
    if v {
        -1
    } else {
        0
    }
}

/// `=` ( a b -- flag )
pub fn eq(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a == b))
}

/// `<` ( a b -- flag )
pub fn lt(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a < b))
}

/// `>` ( a b -- flag )
pub fn gt(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a > b))
}

/// `<=` ( a b -- flag )
pub fn le(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a <= b))
}

/// `>=` ( a b -- flag )
pub fn ge(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a >= b))
}

/// `0=` ( a -- flag )
pub fn zero_eq(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.pop()?;
    forth.push(flag(a == 0))
}

/// `0<` ( a -- flag )
pub fn zero_lt(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.pop()?;
    forth.push(flag(a < 0))
}

/// `not` ( flag -- flag ) a zero cell is false, anything else true.
pub fn not(forth: &mut Forth) -> Result<(), ForthError> {
    let a = forth.pop()?;
    forth.push(flag(a == 0))
}

/// `and` ( a b -- flag ) logical, not bitwise - matches the `0`/`-1` flag
/// convention used throughout rather than a bitwise `&`.
pub fn and(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a != 0 && b != 0))
}

/// `or` ( a b -- flag )
pub fn or(forth: &mut Forth) -> Result<(), ForthError> {
    binop(forth, |a, b| flag(a != 0 || b != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_on_overflow() {
        let mut forth = Forth::new();
        forth.push(i64::MAX).unwrap();
        forth.push(1).unwrap();
        add(&mut forth).unwrap();
        assert_eq!(forth.pop().unwrap(), i64::MIN);
    }

    #[test]
    fn divmod_reports_zero_divisor() {
        let mut forth = Forth::new();
        forth.push(10).unwrap();
        forth.push(0).unwrap();
        assert_eq!(divmod(&mut forth), Err(ForthError::DivisionByZero));
    }

    #[test]
    fn divmod_pushes_quotient_then_remainder() {
        let mut forth = Forth::new();
        forth.push(17).unwrap();
        forth.push(5).unwrap();
        divmod(&mut forth).unwrap();
        assert_eq!(forth.pop().unwrap(), 2);
        assert_eq!(forth.pop().unwrap(), 3);
    }

    #[test]
    fn comparisons_use_the_minus_one_true_convention() {
        let mut forth = Forth::new();
        forth.push(1).unwrap();
        forth.push(2).unwrap();
        lt(&mut forth).unwrap();
        assert_eq!(forth.pop().unwrap(), -1);
    }
}
