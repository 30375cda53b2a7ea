//! Error taxonomy split along the same line `fuel-vm` draws between
//! [`fuel_vm::error::RuntimeError`] (recoverable, vectored to a VM-internal
//! handler) and [`fuel_vm::error::InterpreterError`] (host-visible, ends the
//! call into the step loop). See `fuel-vm/src/error.rs`.

use markab_asm::ErrorCode;

/// A fault raised by the running machine. Every variant corresponds to one
/// [`ErrorCode`]; faults that the interpreter can vector to `$irqerr` are
/// recoverable, the running program simply observes `$err` and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("data stack overflow")]
    DataOver,
    #[error("data stack underflow")]
    DataUnder,
    #[error("address {addr:#06x} (width {width}) is out of bounds")]
    BadAddress { addr: u16, width: u8 },
    #[error("rom image of {size} bytes overflows the heap")]
    BootOverflow { size: usize },
    #[error("byte {byte:#04x} at {pc:#06x} is not a valid opcode")]
    BadInstruction { pc: u16, byte: u8 },
    #[error("return stack overflow")]
    ROver,
    #[error("return stack underflow")]
    RUnder,
    #[error("exceeded the {limit}-cycle dispatch budget")]
    MaxCycles { limit: u32 },
    #[error("path {path:?} rejected by the file-access policy")]
    FilePerms { path: String },
    #[error("file {path:?} not found")]
    FileNotFound { path: String },
    #[error("{word:?} is not a known word or number")]
    UnknownWord { word: String },
    #[error("unbalanced if{{}}if or for{{}}for nesting")]
    Nest,
    #[error("ioload nesting exceeded depth {max}")]
    IoloadDepth { max: u8 },
    #[error("$pc {pc:#06x} is outside the heap")]
    BadPcAddr { pc: u16 },
    #[error("a nested ioload failed")]
    IoloadFail,
    /// `MTE` explicitly raised this code. Unlike the other variants, the
    /// code is whatever the running program pushed — it need not name a
    /// known [`ErrorCode`].
    #[error("raised error {0}")]
    Raised(u8),
}

impl Fault {
    /// The stable numeric code this fault reports as, matching
    /// [`ErrorCode`].
    pub const fn code(&self) -> u8 {
        match self {
            Self::DataOver => ErrorCode::DataOver.code(),
            Self::DataUnder => ErrorCode::DataUnder.code(),
            Self::BadAddress { .. } => ErrorCode::BadAddress.code(),
            Self::BootOverflow { .. } => ErrorCode::BootOverflow.code(),
            Self::BadInstruction { .. } => ErrorCode::BadInstruction.code(),
            Self::ROver => ErrorCode::ROver.code(),
            Self::RUnder => ErrorCode::RUnder.code(),
            Self::MaxCycles { .. } => ErrorCode::MaxCycles.code(),
            Self::FilePerms { .. } => ErrorCode::FilePerms.code(),
            Self::FileNotFound { .. } => ErrorCode::FileNotFound.code(),
            Self::UnknownWord { .. } => ErrorCode::UnknownWord.code(),
            Self::Nest => ErrorCode::Nest.code(),
            Self::IoloadDepth { .. } => ErrorCode::IoloadDepth.code(),
            Self::BadPcAddr { .. } => ErrorCode::BadPcAddr.code(),
            Self::IoloadFail => ErrorCode::IoloadFail.code(),
            Self::Raised(code) => *code,
        }
    }
}

/// A failure that ends the current call into the step loop rather than being
/// vectored to `$irqerr`. Host code (the CLI, or a future embedder) decides
/// what to do next; the interpreter itself cannot recover from these.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum HostError {
    /// A ROM image was too large to load, discovered before boot even runs
    /// (so there is no live `$irqerr` to vector to yet).
    #[error("rom image of {size} bytes overflows the {max}-byte heap")]
    BootOverflow { size: usize, max: usize },

    /// A fault occurred with no error vector installed (`$irqerr` is zero),
    /// or occurred while the one-level-recursive error handler was already
    /// unwinding a prior fault.
    #[error("unhandled fault: {0}")]
    UnhandledFault(Fault),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
