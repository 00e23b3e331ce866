//! The interpreter: dictionary cursor, mode, and the input stream stack.
//!
//! Grounded on the teacher's `ForthRuntime` (`runtime.rs`): one struct that
//! owns the kernel plus every piece of state a primitive might need
//! (`here_ptr`/`context_ptr`/`state_ptr`/`reader` there; `here`/`latest`/
//! `mode`/`input` here). The teacher keeps these as heap-resident cells
//! addressed by pointer variables; this rework keeps them as plain struct
//! fields, since nothing outside this module needs to address them as
//! Forth-visible variables the way `here`/`latest`/`state` are about to
//! become via the `here`/`latest`/`@`/`!` primitives in `builtins`.

pub mod inner;
pub mod outer;

use crate::dictionary::{self, Codeword};
use crate::error::ForthError;
use crate::files::FileHandle;
use crate::kernel::{Kernel, BuiltInFn, Cell, DICT_START};
use crate::messages::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Compile,
}

/// Reserved builtin ids for the words the inner interpreter must treat
/// specially (their operand lives inline in the body stream, or they
/// manipulate the return stack directly). They are registered first, in
/// this order, so their ids are fixed at cold start.
pub const LIT_ID: usize = 0;
pub const BRANCH_ID: usize = 1;
pub const BRANCH0_ID: usize = 2;
pub const EXIT_ID: usize = 3;

pub struct Forth {
    pub kernel: Kernel,
    pub here: usize,
    pub latest: usize,
    pub mode: Mode,
    pub msg: Msg,
    /// Every file stream the interpreter has ever opened, addressed by
    /// index ("handle") - handle 0 is always stdin. `open-read-file`
    /// appends; `close-file` replaces an entry with `None`.
    pub files: Vec<Option<FileHandle>>,
    /// The active input stream stack, as handle ids into `files`. The
    /// bottom entry is always `0` (stdin); `set-input-stream` pushes a new
    /// source, and the tokenizer's refill logic pops an exhausted one.
    pub input: Vec<usize>,
    pub exit_flag: bool,
    pub show_stack: bool,
    /// entry offset of the colon word currently under construction by `:`,
    /// or `None` outside a definition.
    pub defining: Option<usize>,
    /// Text input buffer: the current line and how far the tokenizer has
    /// read into it. Refilled from the top of `input` on exhaustion.
    pub line_buf: String,
    pub line_pos: usize,
}

impl Forth {
    pub fn new() -> Forth {
        Forth {
            kernel: Kernel::new(),
            here: DICT_START,
            latest: 0,
            mode: Mode::Normal,
            msg: Msg::new(),
            files: vec![Some(FileHandle::stdin())],
            input: vec![0],
            exit_flag: false,
            show_stack: true,
            defining: None,
            line_buf: String::new(),
            line_pos: 0,
        }
    }

    pub fn push(&mut self, v: Cell) -> Result<(), ForthError> {
        self.kernel.stack.push(v)
    }

    pub fn pop(&mut self) -> Result<Cell, ForthError> {
        self.kernel.stack.pop()
    }

    pub fn top(&self) -> Result<Cell, ForthError> {
        self.kernel.stack.top()
    }

    /// Register a primitive in both the builtin table and the dictionary,
    /// returning its entry offset. Mirrors the teacher's `add_builtin`,
    /// which does exactly this pairing (`kernel.add_builtin` then
    /// `make_word`).
    pub fn install(
        &mut self,
        name: &str,
        immediate: bool,
        code: fn(&mut Forth) -> Result<(), ForthError>,
        doc: &str,
    ) -> Result<usize, ForthError> {
        let id = self
            .kernel
            .add_builtin(BuiltInFn::new(name.to_string(), code, doc.to_string()));
        let (entry, next) =
            dictionary::push_primitive(&mut self.kernel, self.here, self.latest, name, immediate, id)?;
        self.latest = entry;
        self.here = next;
        Ok(entry)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        dictionary::find(&self.kernel, self.latest, name)
    }

    pub fn codeword_addr(&self, entry: usize) -> usize {
        dictionary::codeword_addr(&self.kernel, entry)
    }

    pub fn codeword(&self, entry: usize) -> Codeword {
        dictionary::codeword(&self.kernel, entry)
    }

    /// Execute the word at the given entry offset, dispatching through the
    /// inner interpreter for colon definitions.
    pub fn execute_entry(&mut self, entry: usize) -> Result<(), ForthError> {
        inner::execute(self, self.codeword_addr(entry))
    }

    pub fn should_exit(&self) -> bool {
        self.exit_flag
    }
}

impl Default for Forth {
    fn default() -> Forth {
        Forth::new()
    }
}
