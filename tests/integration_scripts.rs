//! End-to-end tests that drive whole Forth programs through the public
//! `tforth` API and inspect the resulting stack.
//!
//! Grounded on `davehorner-rsorth`'s `tests/forth_rs_param_tests.rs`: build
//! one small harness that evaluates a source string against an initial
//! stack and returns the final stack, then table-drive it with
//! `test_case`. Unlike that harness this one bootstraps the real
//! `startup.f`, so these cases also exercise `if/then/else/begin/until/
//! while/repeat` as FORTH-defined words, not host primitives.

use std::path::Path;

use test_case::test_case;
use tforth::builtins::install_core;
use tforth::files::{FileHandle, FileMode};
use tforth::interpreter::outer;
use tforth::Forth;

fn bootstrapped() -> Forth {
    let mut forth = Forth::new();
    install_core(&mut forth).expect("primitive installation never fails");
    let handle = FileHandle::open(Path::new("startup.f"), FileMode::RO, &forth.msg)
        .expect("startup.f must be readable from the workspace root during `cargo test`");
    let id = forth.files.len();
    forth.files.push(Some(handle));
    forth.input.push(id);
    outer::run_until(&mut forth, 1);
    forth
}

fn eval_and_stack(program: &str, init_stack: &[i64]) -> Vec<i64> {
    let mut forth = bootstrapped();
    for &v in init_stack {
        forth.push(v).unwrap();
    }
    for token in program.split_whitespace() {
        outer::interpret_one(&mut forth, token)
            .unwrap_or_else(|e| panic!("{token} failed in {program:?}: {e}"));
    }
    forth.kernel.stack.as_slice().to_vec()
}

#[test_case("0", &[], &[0]; "zero")]
#[test_case("42", &[], &[42]; "number")]
#[test_case("true", &[], &[-1]; "true word")]
#[test_case("false", &[], &[0]; "false word")]
#[test_case("+", &[2, 2], &[4]; "simple add")]
#[test_case("-", &[5, 2], &[3]; "simple sub")]
#[test_case("*", &[3, 4], &[12]; "simple mul")]
#[test_case("/", &[12, 3], &[4]; "simple div")]
#[test_case("%", &[13, 5], &[3]; "simple mod")]
#[test_case("divmod", &[13, 5], &[2, 3]; "divmod leaves quotient then remainder")]
#[test_case("1+", &[41], &[42]; "add one")]
#[test_case("1-", &[43], &[42]; "sub one")]
#[test_case("abs", &[-42], &[42]; "abs of negative number")]
#[test_case("abs", &[9], &[9]; "abs of positive number")]
#[test_case("negate", &[9], &[-9]; "negate positive number")]
#[test_case("negate", &[-9], &[9]; "negate negative number")]
#[test_case("<", &[3, 4], &[-1]; "less is true")]
#[test_case("<", &[4, 3], &[0]; "less is false")]
#[test_case(">", &[4, 3], &[-1]; "greater is true")]
#[test_case("0=", &[0], &[-1]; "zero equal")]
#[test_case("0=", &[5], &[0]; "zero equal is false for non-zero")]
#[test_case("not", &[0], &[-1]; "not of false is true")]
#[test_case("not", &[-1], &[0]; "not of true is false")]
#[test_case("and", &[-1, -1], &[-1]; "and of true true")]
#[test_case("and", &[0, -1], &[0]; "and of false true")]
#[test_case("or", &[0, -1], &[-1]; "or of false true")]
#[test_case("or", &[0, 0], &[0]; "or of false false")]
#[test_case("swap", &[1, 2], &[2, 1]; "swap")]
#[test_case("dup", &[42], &[42, 42]; "dup")]
#[test_case("drop", &[1, 2], &[1]; "drop")]
#[test_case("rot", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("over", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("1 pick", &[1, 2, 3], &[1, 2, 3, 2]; "pick")]
#[test_case("3 roll", &[1, 2, 3, 4], &[2, 3, 4, 1]; "roll")]
#[test_case("min", &[3, 5], &[3]; "min picks the smaller")]
#[test_case("max", &[3, 5], &[5]; "max picks the larger")]
#[test_case("2dup", &[1, 2], &[1, 2, 1, 2]; "2dup duplicates the top pair")]
#[test_case("?dup", &[5], &[5, 5]; "?dup duplicates a nonzero top")]
#[test_case("?dup", &[0], &[0]; "?dup leaves a zero top alone")]
#[test_case("nip", &[1, 2], &[2]; "nip drops the second item")]
#[test_case("tuck", &[1, 2], &[2, 1, 2]; "tuck copies the top under the second")]
#[test_case(": f 42 ; f", &[], &[42]; "trivial colon definition")]
#[test_case(": f if 42 then ; f", &[-1], &[42]; "if then inside a definition, taken")]
#[test_case(": f if 42 then ; f", &[0], &[]; "if then inside a definition, not taken")]
#[test_case(": f if 1 else 2 then ; f", &[0], &[2]; "if else then inside a definition, false branch")]
#[test_case(": f if 1 else 2 then ; f", &[-1], &[1]; "if else then inside a definition, true branch")]
#[test_case(": f if 10 else 20 then ; f", &[-1], &[10]; "colon def with if-else-then, true")]
#[test_case(": f if 10 else 20 then ; f", &[0], &[20]; "colon def with if-else-then, false")]
#[test_case(": f begin 1 + dup 10 > until ; f", &[0], &[11]; "begin until loop")]
#[test_case(": f begin 1 + dup 10 < while repeat ; f", &[0], &[10]; "begin while repeat loop")]
fn evaluates_forth_source_against_an_initial_stack(
    program: &str,
    init_stack: &[i64],
    expected: &[i64],
) {
    assert_eq!(eval_and_stack(program, init_stack), expected);
}

#[test]
fn recursive_definitions_can_call_themselves_before_the_closing_semicolon() {
    let mut forth = bootstrapped();
    // `countdown` calls itself, which only works because `:` makes the new
    // entry findable immediately rather than hiding it until `;`.
    for token in ": countdown dup 0 > if 1 - countdown then ; 3 countdown"
        .split_whitespace()
    {
        outer::interpret_one(&mut forth, token).unwrap();
    }
    assert_eq!(forth.pop().unwrap(), 0);
}

#[test]
fn unknown_words_report_a_structured_error_without_poisoning_later_lookups() {
    let mut forth = bootstrapped();
    assert!(outer::interpret_one(&mut forth, "nonesuch").is_err());
    outer::interpret_one(&mut forth, "42").unwrap();
    assert_eq!(forth.pop().unwrap(), 42);
}
