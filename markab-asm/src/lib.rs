//! Atomic types of the Markab virtual machine: the opcode table, the stable
//! error-code taxonomy, and the dictionary entry type tag.
//!
//! This crate has no behavior of its own — it exists so `markab-vm` and
//! `markab-compiler` agree on the same vocabulary without either depending
//! on the other.

mod entry_kind;
mod error_code;
mod opcode;

pub use entry_kind::EntryKind;
pub use error_code::ErrorCode;
pub use opcode::Opcode;
