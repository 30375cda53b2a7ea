//! Purely lexical/structural failures with no VM error-code analogue.
//! Everything that does have one (`UnknownWord`, `Nest`, path rejections)
//! is reported as a [`markab_vm::error::Fault`] instead, the same taxonomy
//! split `fuel-vm/src/error.rs` draws between its two error enums.

use std::path::PathBuf;

use markab_vm::error::Fault;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unterminated ( comment")]
    UnterminatedComment,
    #[error("unterminated load\" string")]
    UnterminatedString,
    #[error("a fault occurred while compiling: {0}")]
    Fault(#[from] Fault),
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{0}` used outside of a `: NAME ... ;` definition")]
    NotInDefinition(&'static str),
    #[error("`;`/`;shdw` closed a definition while `{construct}` nesting was still open")]
    UnclosedConstruct { construct: &'static str },
    #[error("`immediate` applied to a non-OBJ entry")]
    ImmediateOnNonObj,
    #[error("branch distance {distance} exceeds the 8-bit offset field")]
    BranchTooFar { distance: i32 },
}
