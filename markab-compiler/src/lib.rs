//! The bootstrap assembler: compiles Markab source text into a ROM image
//! plus a symbol table, using an embedded [`markab_vm::Interpreter`] as its
//! own compile-time arithmetic and memory engine.

mod compiler;
mod dictionary;
mod error;
mod fileio;
mod hash;
mod rom;
mod tokens;

pub use compiler::{CompileOutput, Compiler};
pub use error::CompileError;
