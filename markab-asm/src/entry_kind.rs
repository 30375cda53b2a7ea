use core::convert::TryFrom;

/// The dictionary entry type tag: determines how the compiler translates a
/// name at compile time and how the payload bytes following the tag are
/// shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryKind {
    /// 4-byte mutable cell. Referencing the name compiles its address.
    Var = 0,
    /// 4-byte literal. Referencing the name compiles a minimal-width
    /// literal push of its value.
    Const = 1,
    /// One opcode byte followed by `RET`. Referencing the name compiles
    /// that opcode byte directly.
    Op = 2,
    /// Compiled bytecode ending in `RET`. Referencing the name compiles a
    /// `JAL` to the payload.
    Obj = 3,
    /// Same payload shape as [`EntryKind::Obj`], but the word runs
    /// immediately during compilation instead of being compiled as a call.
    Imm = 4,
}

impl TryFrom<u8> for EntryKind {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Var),
            1 => Ok(Self::Const),
            2 => Ok(Self::Op),
            3 => Ok(Self::Obj),
            4 => Ok(Self::Imm),
            _ => Err(byte),
        }
    }
}

impl From<EntryKind> for u8 {
    fn from(kind: EntryKind) -> u8 {
        kind as u8
    }
}
