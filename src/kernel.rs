//! Kernel: the dictionary arena and the two data stacks.
//!
//! Grounded on the teacher's `Kernel` (`kernel.rs`): a single struct owning
//! the fixed-size memory backing the whole interpreter, with safe
//! `push`/`pop`/`get`/`set` accessors rather than ambient global state. The
//! teacher keeps the dictionary as an array of `i64` cells overlaid with a
//! separate byte array for strings; this rework keeps the dictionary as a
//! byte arena instead (distilled spec section 3 specifies link/flag/name
//! layout at byte granularity), and folds the scratch token buffer into the
//! front of that same arena rather than maintaining a second memory space.

use crate::error::ForthError;

/// One stack cell. The distilled spec calls for a 64-bit two's-complement
/// machine word used interchangeably as an integer or an address.
pub type Cell = i64;

pub const CELL_SIZE: usize = std::mem::size_of::<Cell>();

/// Size of the tokenizer's scratch buffer (distilled spec section 4.1: up to
/// 63 bytes plus a null terminator).
pub const PAD_SIZE: usize = 64;

/// The dictionary arena begins just after the scratch pad, so the pad's
/// fixed address is always 0 and dictionary offset 0 is never a legitimate
/// dictionary/codeword address - that lets the return stack use the cell
/// value 0 as an unambiguous "no next" sentinel.
pub const PAD_START: usize = 0;
pub const DICT_START: usize = PAD_SIZE;

/// Default arena capacity (distilled spec section 3: "e.g. 65,536 bytes").
pub const DEFAULT_ARENA_SIZE: usize = 65_536;

/// Default depth of each data stack.
pub const DEFAULT_STACK_DEPTH: usize = 4_096;

/// Bit used to discriminate a primitive codeword from a colon-definition
/// codeword (distilled spec section 9, Design Notes: "a discriminated value
/// ... rather than a raw function pointer"). A colon definition's codeword
/// cell holds exactly `COLON_MARKER` (0); a primitive's codeword cell holds
/// `PRIMITIVE_TAG | id`.
pub const PRIMITIVE_TAG: i64 = 1 << 62;
pub const COLON_MARKER: i64 = 0;

/// Bit 0 of the dictionary entry's flag byte.
pub const IMMEDIATE_FLAG: u8 = 0x01;

/// One entry in the builtin (primitive) function table.
///
/// `code` takes the whole interpreter and returns a `Result`, per the
/// error-handling redesign in SPEC_FULL.md section 7: every primitive can
/// fail (stack underflow, bad address) without panicking the process.
pub struct BuiltInFn {
    pub name: String,
    pub code: fn(&mut crate::interpreter::Forth) -> Result<(), ForthError>,
    pub doc: String,
}

impl BuiltInFn {
    pub fn new(
        name: String,
        code: fn(&mut crate::interpreter::Forth) -> Result<(), ForthError>,
        doc: String,
    ) -> BuiltInFn {
        BuiltInFn { name, code, doc }
    }
}

/// A fixed-capacity LIFO of cells, used for both the parameter stack and
/// the return stack.
pub struct Stack {
    cells: Vec<Cell>,
    name: &'static str,
}

impl Stack {
    pub fn new(depth: usize, name: &'static str) -> Stack {
        Stack {
            cells: Vec::with_capacity(depth),
            name,
        }
    }

    #[inline]
    pub fn push(&mut self, val: Cell) -> Result<(), ForthError> {
        if self.cells.len() == self.cells.capacity() {
            return Err(ForthError::StackOverflow { word: self.name });
        }
        self.cells.push(val);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Cell, ForthError> {
        self.cells.pop().ok_or(ForthError::StackUnderflow {
            word: self.name,
            needed: 1,
            available: 0,
        })
    }

    #[inline]
    pub fn top(&self) -> Result<Cell, ForthError> {
        self.cells.last().copied().ok_or(ForthError::StackUnderflow {
            word: self.name,
            needed: 1,
            available: 0,
        })
    }

    /// Peek n cells down from the top (0 = top itself).
    pub fn peek(&self, n: usize) -> Result<Cell, ForthError> {
        let len = self.cells.len();
        if n >= len {
            return Err(ForthError::StackUnderflow {
                word: self.name,
                needed: n + 1,
                available: len,
            });
        }
        Ok(self.cells[len - 1 - n])
    }

    pub fn check(&self, needed: usize) -> Result<(), ForthError> {
        if self.cells.len() < needed {
            return Err(ForthError::StackUnderflow {
                word: self.name,
                needed,
                available: self.cells.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Remove the nth-from-top cell and push it back on top (`roll`).
    pub fn roll(&mut self, n: usize) -> Result<(), ForthError> {
        self.check(n + 1)?;
        let len = self.cells.len();
        let idx = len - 1 - n;
        let val = self.cells.remove(idx);
        self.cells.push(val);
        Ok(())
    }
}

pub struct Kernel {
    /// Dictionary arena: [0..PAD_SIZE) is the tokenizer's scratch buffer,
    /// [DICT_START..) holds dictionary entries.
    arena: Vec<u8>,
    pub builtins: Vec<BuiltInFn>,
    pub stack: Stack,
    pub return_stack: Stack,
}

impl Kernel {
    pub fn new() -> Kernel {
        Kernel::with_capacity(DEFAULT_ARENA_SIZE, DEFAULT_STACK_DEPTH)
    }

    pub fn with_capacity(arena_size: usize, stack_depth: usize) -> Kernel {
        Kernel {
            arena: vec![0u8; arena_size],
            builtins: Vec::new(),
            stack: Stack::new(stack_depth, "data stack"),
            return_stack: Stack::new(stack_depth, "return stack"),
        }
    }

    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn byte(&self, addr: usize) -> u8 {
        self.arena[addr]
    }

    #[inline]
    pub fn set_byte(&mut self, addr: usize, val: u8) {
        self.arena[addr] = val;
    }

    pub fn bytes(&self, addr: usize, len: usize) -> &[u8] {
        &self.arena[addr..addr + len]
    }

    pub fn write_bytes(&mut self, addr: usize, data: &[u8]) {
        self.arena[addr..addr + data.len()].copy_from_slice(data);
    }

    /// Read a cell (8-byte little-endian) at a byte address.
    #[inline]
    pub fn cell(&self, addr: usize) -> Cell {
        let mut buf = [0u8; CELL_SIZE];
        buf.copy_from_slice(&self.arena[addr..addr + CELL_SIZE]);
        Cell::from_le_bytes(buf)
    }

    /// Write a cell (8-byte little-endian) at a byte address.
    #[inline]
    pub fn set_cell(&mut self, addr: usize, val: Cell) {
        self.arena[addr..addr + CELL_SIZE].copy_from_slice(&val.to_le_bytes());
    }

    pub fn add_builtin(&mut self, builtin: BuiltInFn) -> usize {
        self.builtins.push(builtin);
        self.builtins.len() - 1
    }

    pub fn builtin(&self, id: usize) -> &BuiltInFn {
        &self.builtins[id]
    }

    pub fn builtin_count(&self) -> usize {
        self.builtins.len()
    }
}

impl Default for Kernel {
    fn default() -> Kernel {
        Kernel::new()
    }
}
