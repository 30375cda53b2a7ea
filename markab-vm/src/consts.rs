//! Fixed addresses and sizes that make up the memory map. Grounded on
//! `fuel-vm`'s plain `pub const` layout of its VM-reserved region
//! (`fuel-vm/src/consts.rs`), adapted to the addresses this machine actually
//! needs.

/// Total addressable memory. `$pc`, `$a`, `$b`, and every load/store address
/// are `u16`, so this is also the size of the address space.
pub const RAM_SIZE: usize = 0x1_0000;

/// First address of the heap. ROM images load starting here.
pub const HEAP_BASE: u16 = 0x0000;

/// Last address the dictionary heap may occupy, and the last legal value of
/// `$pc` during a fetch. One past this is the first byte of the reserved
/// high region.
pub const HEAP_MAX: u16 = 0xDFFF;

/// First address of the high region: fixed interpreter cells that do not
/// move as the dictionary grows.
pub const HIGH_REGION_BASE: u16 = 0xE000;

/// Dictionary pointer cell (halfword): the address one past the last byte
/// used by the dictionary heap.
pub const DP_ADDR: u16 = 0xE000;

/// Absolute address of the 64-bucket hash bucket array (halfword cell
/// holding that address, seeded by the boot prologue).
pub const HASHMAP_PTR_ADDR: u16 = 0xE002;

/// Receive-line interrupt vector (halfword cell).
pub const IRQRX_ADDR: u16 = 0xE004;

/// Error interrupt vector (halfword cell).
pub const IRQERR_ADDR: u16 = 0xE006;

/// Terminal input buffer window: scratch memory for the booted kernel's own
/// line-reading code. Distinct from the host-facing input queue the
/// interpreter drains on `IOKEY`.
pub const TIB_ADDR: u16 = 0xE400;
pub const TIB_MAX: u16 = 0xE7FF;

/// General-purpose formatting scratch window (numeric-to-string, etc).
pub const PAD_ADDR: u16 = 0xE800;
pub const PAD_MAX: u16 = 0xEBFF;

/// Second scratch window, free for kernel use.
pub const SCRATCH_ADDR: u16 = 0xEC00;
pub const SCRATCH_MAX: u16 = 0xEFFF;

/// Default offset, from the heap base, of the 64-entry hash bucket array
/// that the boot prologue writes right after its four initializer
/// sequences (`4 * 7` bytes: `U16 imm, U16 addr, SH`).
pub const HASHMAP_BASE_DEFAULT: u16 = 0x001C;

/// Number of buckets in the core-vocabulary hashmap.
pub const HASH_BINS: usize = 64;

/// Byte size of the hashmap bucket array (`HASH_BINS` halfword cells).
pub const HASHMAP_BYTES: u16 = (HASH_BINS * 2) as u16;

/// Multiply-with-carry hash constants.
pub const HASH_A: u32 = 7;
pub const HASH_B: u32 = 8;
pub const HASH_C: u32 = 38335;
pub const HASH_MASK: u32 = 63;

/// Data stack capacity, counted in cells (including `$t` and `$s`).
pub const DATA_STACK_CAPACITY: usize = 18;

/// Return stack capacity, counted in cells (including `$r`).
pub const RETURN_STACK_CAPACITY: usize = 17;

/// Hard ceiling on the number of fetch/dispatch cycles a single call into
/// the step loop may run before it is forced to stop with `MaxCycles`.
pub const MAX_CYCLES: u32 = 65_535;

/// Maximum width, in bytes, a single load or store may touch.
pub const MAX_ACCESS_WIDTH: u16 = 4;

/// Numeric base the machine boots with.
pub const DEFAULT_BASE: u8 = 10;
