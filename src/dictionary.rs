//! Dictionary entry layout and lookup.
//!
//! Grounded on the teacher's `compiler.rs` (`f_create`, `f_find`,
//! `f_comma`, `u_get_string`) and `runtime.rs` (`insert_variables`,
//! `compile_builtins`), which build dictionary entries directly against the
//! `heap` array. Here the same responsibilities - encode an entry, walk the
//! linked list by name, read back a codeword - are pulled into one module
//! that operates on the byte arena described in section 3 of SPEC_FULL.md.
//!
//! Entry layout, in arena byte order:
//!   link (8 bytes) | flags (1 byte) | name bytes | 0u8 | padding | codeword (8 bytes) | body (8 bytes * n)
//! The codeword field always starts at an 8-byte-aligned offset.

use crate::error::ForthError;
use crate::kernel::{Kernel, CELL_SIZE, COLON_MARKER, IMMEDIATE_FLAG, PRIMITIVE_TAG};

/// The discriminated codeword value stored in an entry's codeword cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codeword {
    Primitive(usize),
    Colon,
}

impl Codeword {
    pub fn pack(self) -> i64 {
        match self {
            Codeword::Primitive(id) => PRIMITIVE_TAG | (id as i64),
            Codeword::Colon => COLON_MARKER,
        }
    }

    pub fn unpack(raw: i64) -> Codeword {
        if raw & PRIMITIVE_TAG != 0 {
            Codeword::Primitive((raw & !PRIMITIVE_TAG) as usize)
        } else {
            Codeword::Colon
        }
    }
}

/// Round `n` up to the next multiple of the cell size.
fn align(n: usize) -> usize {
    (n + CELL_SIZE - 1) / CELL_SIZE * CELL_SIZE
}

/// Offset, relative to an entry's start, of its flag byte.
const FLAG_OFFSET: usize = CELL_SIZE;
/// Offset, relative to an entry's start, of the first name byte.
const NAME_OFFSET: usize = CELL_SIZE + 1;

/// Append a new dictionary entry with the given name, flags and codeword,
/// returning its arena offset and the offset just past its codeword cell
/// (where the caller should start writing body cells, if any).
///
/// `latest` is the offset of the previously-most-recent entry, or `0` if
/// this is the first entry ever defined.
pub fn create_entry(
    kernel: &mut Kernel,
    here: usize,
    latest: usize,
    name: &str,
    immediate: bool,
    codeword: Codeword,
) -> Result<(usize, usize), ForthError> {
    let entry = here;
    let name_len = name.len();
    let codeword_offset = align(entry + NAME_OFFSET + name_len + 1);
    let body_start = codeword_offset + CELL_SIZE;
    if body_start > kernel.arena_len() {
        return Err(ForthError::DictionaryFull);
    }

    kernel.set_cell(entry, latest as i64);
    kernel.set_byte(entry + FLAG_OFFSET, if immediate { IMMEDIATE_FLAG } else { 0 });
    kernel.write_bytes(entry + NAME_OFFSET, name.as_bytes());
    kernel.set_byte(entry + NAME_OFFSET + name_len, 0);
    for pad in entry + NAME_OFFSET + name_len + 1..codeword_offset {
        kernel.set_byte(pad, 0);
    }
    kernel.set_cell(codeword_offset, codeword.pack());

    Ok((entry, body_start))
}

/// Append a primitive word with no body.
pub fn push_primitive(
    kernel: &mut Kernel,
    here: usize,
    latest: usize,
    name: &str,
    immediate: bool,
    builtin_id: usize,
) -> Result<(usize, usize), ForthError> {
    create_entry(kernel, here, latest, name, immediate, Codeword::Primitive(builtin_id))
}

/// Append a colon definition whose body is exactly the given list of
/// already-tagged cells (references to other words, or inline operands),
/// terminated by the caller-supplied `exit` codeword.
pub fn push_colon_from_list(
    kernel: &mut Kernel,
    here: usize,
    latest: usize,
    name: &str,
    immediate: bool,
    body: &[i64],
) -> Result<(usize, usize), ForthError> {
    let (entry, mut cursor) = create_entry(kernel, here, latest, name, immediate, Codeword::Colon)?;
    let end = cursor + body.len() * CELL_SIZE;
    if end > kernel.arena_len() {
        return Err(ForthError::DictionaryFull);
    }
    for cell in body {
        kernel.set_cell(cursor, *cell);
        cursor += CELL_SIZE;
    }
    Ok((entry, cursor))
}

/// Begin a colon definition with an empty body, returning the entry offset
/// and the offset at which the first body cell should be written (used by
/// `:` while the definition is still being compiled one `,` at a time).
pub fn push_colon_raw(
    kernel: &mut Kernel,
    here: usize,
    latest: usize,
    name: &str,
) -> Result<(usize, usize), ForthError> {
    create_entry(kernel, here, latest, name, false, Codeword::Colon)
}

/// Read the flag byte of an entry.
pub fn flags(kernel: &Kernel, entry: usize) -> u8 {
    kernel.byte(entry + FLAG_OFFSET)
}

pub fn is_immediate(kernel: &Kernel, entry: usize) -> bool {
    flags(kernel, entry) & IMMEDIATE_FLAG != 0
}

pub fn set_immediate(kernel: &mut Kernel, entry: usize, immediate: bool) {
    let f = if immediate { IMMEDIATE_FLAG } else { 0 };
    kernel.set_byte(entry + FLAG_OFFSET, f);
}

/// Read an entry's link field (offset of the previous entry, or 0).
pub fn link(kernel: &Kernel, entry: usize) -> usize {
    kernel.cell(entry) as usize
}

/// Read an entry's name.
pub fn wordname(kernel: &Kernel, entry: usize) -> String {
    let mut addr = entry + NAME_OFFSET;
    let mut bytes = Vec::new();
    loop {
        let b = kernel.byte(addr);
        if b == 0 {
            break;
        }
        bytes.push(b);
        addr += 1;
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Offset of an entry's codeword cell.
pub fn codeword_addr(kernel: &Kernel, entry: usize) -> usize {
    let mut addr = entry + NAME_OFFSET;
    loop {
        if kernel.byte(addr) == 0 {
            addr += 1;
            break;
        }
        addr += 1;
    }
    align(addr)
}

/// Read an entry's codeword value.
pub fn codeword(kernel: &Kernel, entry: usize) -> Codeword {
    Codeword::unpack(kernel.cell(codeword_addr(kernel, entry)))
}

/// Offset of the first body cell following an entry's codeword.
pub fn body_start(kernel: &Kernel, entry: usize) -> usize {
    codeword_addr(kernel, entry) + CELL_SIZE
}

/// Search the dictionary, most-recently-defined entry first, for a word
/// matching `name`. Returns its entry offset.
pub fn find(kernel: &Kernel, latest: usize, name: &str) -> Option<usize> {
    let mut entry = latest;
    while entry != 0 {
        if wordname(kernel, entry) == name {
            return Some(entry);
        }
        entry = link(kernel, entry);
    }
    None
}
