use core::convert::TryFrom;

/// One-byte instruction opcode for the Markab virtual machine.
///
/// Fetch reads a single byte at `$pc`, advances `$pc` by one, and dispatches
/// on this value. Any immediate operands (for `U8`/`U16`/`I32`, the 8-bit
/// offsets of `BZ`/`BFOR`, or the 16-bit offsets of `JMP`/`JAL`) are read raw
/// from the bytes immediately following the opcode and are not part of this
/// type — `Opcode` names the operation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::EnumCount)]
#[repr(u8)]
#[non_exhaustive]
pub enum Opcode {
    // --- Control ---------------------------------------------------------
    /// Do nothing.
    Nop = 0,
    /// Unconditional jump: `$pc += offset`, where `offset` is a 16-bit
    /// signed value read from the instruction stream, relative to the
    /// address of the byte immediately following the offset field.
    Jmp,
    /// Jump and link: same offset semantics as [`Opcode::Jmp`], but first
    /// pushes the post-offset-field return address onto the return stack.
    Jal,
    /// Pop `$t` and jump to it as an absolute address, pushing the caller's
    /// return address onto the return stack.
    Call,
    /// Pop the return stack into `$pc`. Popping an empty return stack ends
    /// the outermost execution (the step loop returns to its caller).
    Ret,
    /// Branch on zero: drop `$t`; if it was zero, `$pc` advances by an
    /// unsigned 8-bit offset byte read from the stream, else `$pc` advances
    /// only past the offset byte, falling into the conditional body.
    Bz,
    /// Counted-loop back-branch: decrement `$r`; while `$r >= 0`, subtract
    /// an unsigned 8-bit offset byte from `$pc` (looping back); otherwise
    /// advance past the offset byte and drop `$r`.
    Bfor,
    /// Set the halted flag. The host observes it after the step loop
    /// returns and stops feeding the VM further input.
    Halt,
    /// Reset both stacks.
    Reset,

    // --- Literals ----------------------------------------------------
    /// Push an 8-bit immediate, zero-extended to 32 bits.
    U8,
    /// Push a 16-bit little-endian immediate, zero-extended to 32 bits.
    U16,
    /// Push a 32-bit little-endian immediate, sign-extended (it already is
    /// the full width of the stack cell).
    I32,

    // --- Memory ------------------------------------------------------
    /// Load a byte from address `$t`, zero-extended.
    Lb,
    /// Store the low byte of `$s` at address `$t`.
    Sb,
    /// Load a halfword from address `$t`, zero-extended.
    Lh,
    /// Store the low 16 bits of `$s` at address `$t`.
    Sh,
    /// Load a word from address `$t`.
    Lw,
    /// Store `$s` (all 32 bits) at address `$t`.
    Sw,

    // --- Arithmetic / logic on (S, T) -> S --------------------------------
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    /// Shift left logical.
    Sll,
    /// Shift right logical (zero-fill).
    Srl,
    /// Shift right arithmetic (sign-fill).
    Sra,

    // --- Unary on T --------------------------------------------------
    /// Bitwise complement of `$t`.
    Inv,
    /// `$t += 1`.
    Inc,
    /// `$t -= 1`.
    Dec,
    /// `$t = ($t == 0) ? -1 : 0`.
    Ze,

    // --- Comparison (S, T) -> S --------------------------------------
    /// `-1` if equal, else `0`.
    Eq,
    /// `-1` if `$s > $t`, else `0`.
    Gt,
    /// `-1` if `$s < $t`, else `0`.
    Lt,
    /// `-1` if not equal, else `0`.
    Ne,
    /// Push `-1`.
    True,
    /// Push `0`.
    False,

    // --- Stacks --------------------------------------------------------
    Drop,
    Dup,
    Over,
    Swap,
    /// Move `$t` to the return stack (drop `$t`, push onto return stack).
    Mtr,
    /// Drop the top of the return stack.
    Rdrop,
    /// Push a copy of the top of the return stack.
    R,
    /// Push a copy of `$pc`.
    Pc,
    /// Move `$t` into `$err` and raise the error interrupt.
    Mte,

    // --- Register / stream ports -----------------------------------------
    /// Move `$t` into register `$a`, dropping `$t`.
    Mta,
    /// Move `$t` into register `$b`, dropping `$t`.
    Mtb,
    /// Push a copy of register `$a`.
    A,
    /// Push a copy of register `$b`.
    B,
    /// `$a += 1`.
    Ainc,
    /// `$a -= 1`.
    Adec,
    /// `$b += 1`.
    Binc,
    /// `$b -= 1`.
    Bdec,
    /// Load the byte at address `$a`.
    Lba,
    /// Load the byte at address `$b`.
    Lbb,
    /// Load the byte at address `$a`, then increment `$a`.
    Lbai,
    /// Load the byte at address `$b`, then increment `$b`.
    Lbbi,
    /// Store the low byte of `$t` at address `$b`, then increment `$b`.
    Sbbi,

    // --- I/O -----------------------------------------------------------
    /// Pull the next input byte. Pushes `{byte, -1}` on success, or `{0}`
    /// if the input buffer is empty.
    Iokey,
    /// Append the low byte of `$t` to the output buffer. A low byte of 10
    /// (newline) flushes the buffer to the host before the next step call
    /// returns.
    Ioemit,
    /// Print `$t` as a decimal number.
    Iodot,
    /// Debug-dump the data stack in decimal.
    Iod,
    /// Debug-dump the data stack in hexadecimal.
    Iodh,
    /// Debug-dump the return stack in hexadecimal.
    Iorh,
    /// Hex-dump `$s` bytes starting at address `$t` (both popped).
    Iodump,
    /// Enable instruction tracing.
    Tron,
    /// Disable instruction tracing.
    Troff,
    /// Interpret the file named by the Markab string at `$t`, subject to
    /// the path allow-list and working-directory containment policy.
    Ioload,
    /// Reserved: save the current ROM image, subject to the same path
    /// policy as [`Opcode::Ioload`]. Semantics beyond the path check are
    /// unspecified (see `DESIGN.md`).
    Iosave,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Fopen,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Fread,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Fwrite,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Fseek,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Ftell,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Ftrunc,
    /// Reserved file-I/O opcode; no defined runtime behavior.
    Fclose,
}

impl Opcode {
    /// Total number of distinct opcodes in the table.
    pub const COUNT: usize = <Self as strum::EnumCount>::COUNT;
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Nop),
            1 => Ok(Self::Jmp),
            2 => Ok(Self::Jal),
            3 => Ok(Self::Call),
            4 => Ok(Self::Ret),
            5 => Ok(Self::Bz),
            6 => Ok(Self::Bfor),
            7 => Ok(Self::Halt),
            8 => Ok(Self::Reset),
            9 => Ok(Self::U8),
            10 => Ok(Self::U16),
            11 => Ok(Self::I32),
            12 => Ok(Self::Lb),
            13 => Ok(Self::Sb),
            14 => Ok(Self::Lh),
            15 => Ok(Self::Sh),
            16 => Ok(Self::Lw),
            17 => Ok(Self::Sw),
            18 => Ok(Self::Add),
            19 => Ok(Self::Sub),
            20 => Ok(Self::Mul),
            21 => Ok(Self::Div),
            22 => Ok(Self::Mod),
            23 => Ok(Self::And),
            24 => Ok(Self::Or),
            25 => Ok(Self::Xor),
            26 => Ok(Self::Sll),
            27 => Ok(Self::Srl),
            28 => Ok(Self::Sra),
            29 => Ok(Self::Inv),
            30 => Ok(Self::Inc),
            31 => Ok(Self::Dec),
            32 => Ok(Self::Ze),
            33 => Ok(Self::Eq),
            34 => Ok(Self::Gt),
            35 => Ok(Self::Lt),
            36 => Ok(Self::Ne),
            37 => Ok(Self::True),
            38 => Ok(Self::False),
            39 => Ok(Self::Drop),
            40 => Ok(Self::Dup),
            41 => Ok(Self::Over),
            42 => Ok(Self::Swap),
            43 => Ok(Self::Mtr),
            44 => Ok(Self::Rdrop),
            45 => Ok(Self::R),
            46 => Ok(Self::Pc),
            47 => Ok(Self::Mte),
            48 => Ok(Self::Mta),
            49 => Ok(Self::Mtb),
            50 => Ok(Self::A),
            51 => Ok(Self::B),
            52 => Ok(Self::Ainc),
            53 => Ok(Self::Adec),
            54 => Ok(Self::Binc),
            55 => Ok(Self::Bdec),
            56 => Ok(Self::Lba),
            57 => Ok(Self::Lbb),
            58 => Ok(Self::Lbai),
            59 => Ok(Self::Lbbi),
            60 => Ok(Self::Sbbi),
            61 => Ok(Self::Iokey),
            62 => Ok(Self::Ioemit),
            63 => Ok(Self::Iodot),
            64 => Ok(Self::Iod),
            65 => Ok(Self::Iodh),
            66 => Ok(Self::Iorh),
            67 => Ok(Self::Iodump),
            68 => Ok(Self::Tron),
            69 => Ok(Self::Troff),
            70 => Ok(Self::Ioload),
            71 => Ok(Self::Iosave),
            72 => Ok(Self::Fopen),
            73 => Ok(Self::Fread),
            74 => Ok(Self::Fwrite),
            75 => Ok(Self::Fseek),
            76 => Ok(Self::Ftell),
            77 => Ok(Self::Ftrunc),
            78 => Ok(Self::Fclose),
            _ => Err(byte),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_opcode_round_trips_through_u8() {
        for op in Opcode::iter() {
            let byte: u8 = op.into();
            assert_eq!(Opcode::try_from(byte), Ok(op));
        }
    }

    #[test]
    fn byte_past_the_table_is_rejected() {
        assert_eq!(Opcode::try_from(u8::try_from(Opcode::COUNT).unwrap()), Err(u8::try_from(Opcode::COUNT).unwrap()));
        assert_eq!(Opcode::try_from(u8::MAX), Err(u8::MAX));
    }

    #[test]
    fn table_has_roughly_seventy_opcodes() {
        assert!(Opcode::COUNT >= 65 && Opcode::COUNT <= 85);
    }
}
