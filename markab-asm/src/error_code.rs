use core::convert::TryFrom;
use core::fmt;

/// Stable numeric error code exposed to Markab code and host tooling.
///
/// These are pushed onto the data stack by the error interrupt and are the
/// only channel through which a running program observes a fault — there is
/// no exception object, just this code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[repr(u8)]
pub enum ErrorCode {
    /// Data stack overflow: a push exceeded capacity. Resets both stacks.
    DataOver = 1,
    /// Data stack underflow: an operation needed more operands than present.
    DataUnder = 2,
    /// An address, or an address plus the access width, fell outside RAM.
    BadAddress = 3,
    /// A ROM image did not fit below the heap limit.
    BootOverflow = 4,
    /// Fetch decoded a byte with no corresponding opcode.
    BadInstruction = 5,
    /// Return stack overflow.
    ROver = 6,
    /// Return stack underflow.
    RUnder = 7,
    /// The step loop exhausted its dispatch budget.
    MaxCycles = 8,
    /// A file path failed the allow-list or working-directory containment
    /// check. Also known as `ErrFilepath`.
    FilePerms = 9,
    /// A file named by `IOLOAD`/`IOSAVE` does not exist.
    FileNotFound = 10,
    /// The compiler could not resolve a token as a dictionary name or a
    /// number in the current base.
    UnknownWord = 11,
    /// A compiler block construct (`if{`/`for{`) was left unbalanced.
    Nest = 12,
    /// `IOLOAD` nesting exceeded the configured maximum depth.
    IoloadDepth = 13,
    /// `$pc` pointed outside the heap range on fetch.
    BadPcAddr = 14,
    /// An error occurred while a file load was in progress; latched so the
    /// unwind through nested loads does not also print a success prompt.
    IoloadFail = 15,
}

impl ErrorCode {
    /// `FILE_PERMS` under its alternate name from the original kernel.
    pub const ERR_FILEPATH: Self = Self::FilePerms;

    /// The stable numeric code, as pushed onto the data stack.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DataOver => "DATA_OVER",
            Self::DataUnder => "DATA_UNDER",
            Self::BadAddress => "BAD_ADDRESS",
            Self::BootOverflow => "BOOT_OVERFLOW",
            Self::BadInstruction => "BAD_INSTRUCTION",
            Self::ROver => "R_OVER",
            Self::RUnder => "R_UNDER",
            Self::MaxCycles => "MAX_CYCLES",
            Self::FilePerms => "FILE_PERMS",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::UnknownWord => "UNKNOWN_WORD",
            Self::Nest => "NEST",
            Self::IoloadDepth => "IOLOAD_DEPTH",
            Self::BadPcAddr => "BAD_PC_ADDR",
            Self::IoloadFail => "IOLOAD_FAIL",
        };
        write!(f, "{name} ({})", self.code())
    }
}

impl TryFrom<u8> for ErrorCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            1 => Ok(Self::DataOver),
            2 => Ok(Self::DataUnder),
            3 => Ok(Self::BadAddress),
            4 => Ok(Self::BootOverflow),
            5 => Ok(Self::BadInstruction),
            6 => Ok(Self::ROver),
            7 => Ok(Self::RUnder),
            8 => Ok(Self::MaxCycles),
            9 => Ok(Self::FilePerms),
            10 => Ok(Self::FileNotFound),
            11 => Ok(Self::UnknownWord),
            12 => Ok(Self::Nest),
            13 => Ok(Self::IoloadDepth),
            14 => Ok(Self::BadPcAddr),
            15 => Ok(Self::IoloadFail),
            _ => Err(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_error_code_round_trips() {
        for code in ErrorCode::iter() {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn codes_are_stable_and_one_indexed() {
        assert_eq!(ErrorCode::DataOver.code(), 1);
        assert_eq!(ErrorCode::IoloadFail.code(), 15);
    }
}
