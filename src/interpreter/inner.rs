//! The inner interpreter: threaded-code dispatch over the dictionary arena.
//!
//! Grounded on the teacher's `i_definition` (`internals/inner.rs`), which
//! walks a program counter through a compiled word's body, branching on a
//! tag value read from each cell, pushing/popping a return address on the
//! return stack for `docol`/`exit`. This keeps the same shape - one pc, one
//! dispatch loop, the return stack as the call stack - but replaces the
//! tag space (`BUILTIN`/`VARIABLE`/.../raw address) with the two-value
//! `Codeword` scheme described in SPEC_FULL.md section 9, and replaces the
//! teacher's `panic!`-on-underflow stack access with `Result` propagation.

use crate::dictionary::{self, Codeword};
use crate::error::ForthError;
use crate::interpreter::{Forth, BRANCH0_ID, BRANCH_ID, EXIT_ID, LIT_ID};
use crate::kernel::CELL_SIZE;

/// Execute the word whose codeword lives at `codeword_addr`.
///
/// For a primitive, this calls its Rust function directly. For a colon
/// definition, this runs the full threaded-code loop: `current`/`next`
/// registers are the local `pc`, `docol` pushes the resume address on the
/// return stack, `exit` pops it. A `0` popped off the return stack means
/// "no caller" - the body that was entered directly by `execute_entry`, not
/// via a nested call - and ends the loop.
pub fn execute(forth: &mut Forth, codeword_addr: usize) -> Result<(), ForthError> {
    match Codeword::unpack(forth.kernel.cell(codeword_addr)) {
        Codeword::Primitive(id) => call_primitive(forth, id),
        Codeword::Colon => run(forth, dictionary_body_start(forth, codeword_addr)),
    }
}

fn dictionary_body_start(forth: &Forth, codeword_addr: usize) -> usize {
    codeword_addr + CELL_SIZE
}

/// Primitives invoked directly (not as part of a compiled body) have no
/// inline operand to consume. `lit`/`branch`/`0branch` make no sense
/// outside a body and are harmless no-ops; `exit` at the top level has
/// nothing to return from, so it is also a no-op.
fn call_primitive(forth: &mut Forth, id: usize) -> Result<(), ForthError> {
    match id {
        LIT_ID | BRANCH_ID | BRANCH0_ID | EXIT_ID => Ok(()),
        _ => {
            let code = forth.kernel.builtin(id).code;
            code(forth)
        }
    }
}

/// Run the threaded-code loop starting at `pc`, the first body cell of a
/// colon definition.
fn run(forth: &mut Forth, mut pc: usize) -> Result<(), ForthError> {
    forth.kernel.return_stack.push(0)?;
    loop {
        let cell = forth.kernel.cell(pc);
        let target_codeword_addr = cell as usize;
        let tag = Codeword::unpack(forth.kernel.cell(target_codeword_addr));
        match tag {
            Codeword::Primitive(LIT_ID) => {
                let operand = forth.kernel.cell(pc + CELL_SIZE);
                forth.push(operand)?;
                pc += 2 * CELL_SIZE;
            }
            Codeword::Primitive(BRANCH_ID) => {
                pc = branch_target(forth, pc);
            }
            Codeword::Primitive(BRANCH0_ID) => {
                let after_operand = pc + 2 * CELL_SIZE;
                let flag = forth.pop()?;
                pc = if flag == 0 {
                    branch_target(forth, pc)
                } else {
                    after_operand
                };
            }
            Codeword::Primitive(EXIT_ID) => {
                let ret = forth.kernel.return_stack.pop()? as usize;
                if ret == 0 {
                    return Ok(());
                }
                pc = ret;
            }
            Codeword::Primitive(id) => {
                let code = forth.kernel.builtin(id).code;
                code(forth)?;
                pc += CELL_SIZE;
            }
            Codeword::Colon => {
                forth
                    .kernel
                    .return_stack
                    .push((pc + CELL_SIZE) as i64)?;
                pc = dictionary_body_start(forth, target_codeword_addr);
            }
        }
    }
}

/// `branch`/`0branch`'s operand is a signed cell count relative to the
/// address just after the operand cell (so `0` is a no-op that falls
/// through to the next instruction, and `-2` re-enters the branch opcode
/// itself for a tight loop).
fn branch_target(forth: &Forth, pc: usize) -> usize {
    let operand = forth.kernel.cell(pc + CELL_SIZE);
    let after_operand = (pc + 2 * CELL_SIZE) as i64;
    (after_operand + operand * CELL_SIZE as i64) as usize
}

/// `'` / `find-word` support: resolve a name to the tagged codeword value
/// that should be stored in a compiled body to call it.
pub fn codeword_value_for(forth: &Forth, entry: usize) -> i64 {
    dictionary::codeword_addr(&forth.kernel, entry) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Forth;

    fn install_core(forth: &mut Forth) {
        forth.install("lit", false, |_| Ok(()), "").unwrap();
        forth.install("branch", false, |_| Ok(()), "").unwrap();
        forth.install("0branch", false, |_| Ok(()), "").unwrap();
        forth.install("exit", false, |_| Ok(()), "").unwrap();
        forth
            .install(
                "+",
                false,
                |f| {
                    let b = f.pop()?;
                    let a = f.pop()?;
                    f.push(a.wrapping_add(b))
                },
                "",
            )
            .unwrap();
    }

    #[test]
    fn runs_a_colon_word_that_adds_two_literals() {
        let mut forth = Forth::new();
        install_core(&mut forth);
        let lit = forth.find("lit").unwrap();
        let plus = forth.find("+").unwrap();
        let exit = forth.find("exit").unwrap();
        let lit_cw = codeword_value_for(&forth, lit);
        let plus_cw = codeword_value_for(&forth, plus);
        let exit_cw = codeword_value_for(&forth, exit);

        let body = vec![lit_cw, 3, lit_cw, 4, plus_cw, exit_cw];
        let (entry, _) = crate::dictionary::push_colon_from_list(
            &mut forth.kernel,
            forth.here,
            forth.latest,
            "seven",
            false,
            &body,
        )
        .unwrap();
        forth.latest = entry;

        forth.execute_entry(entry).unwrap();
        assert_eq!(forth.pop().unwrap(), 7);
    }

    #[test]
    fn branch_skips_to_the_address_after_its_operand_plus_offset() {
        let mut forth = Forth::new();
        install_core(&mut forth);
        let lit = forth.find("lit").unwrap();
        let branch = forth.find("branch").unwrap();
        let exit = forth.find("exit").unwrap();
        let lit_cw = codeword_value_for(&forth, lit);
        let branch_cw = codeword_value_for(&forth, branch);
        let exit_cw = codeword_value_for(&forth, exit);

        // lit 1, branch +2 (skip the next lit), lit 2, exit
        let body = vec![lit_cw, 1, branch_cw, 2, lit_cw, 2, exit_cw];
        let (entry, _) = crate::dictionary::push_colon_from_list(
            &mut forth.kernel,
            forth.here,
            forth.latest,
            "skip",
            false,
            &body,
        )
        .unwrap();
        forth.latest = entry;

        forth.execute_entry(entry).unwrap();
        assert_eq!(forth.pop().unwrap(), 1);
        assert!(forth.pop().is_err());
    }
}
