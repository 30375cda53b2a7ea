//! Flat, bound-checked memory. Grounded on the bound-check shape of
//! `fuel-vm`'s `try_mem_write`/`try_mem_read`
//! (`fuel-vm/src/interpreter/memory.rs`): every access validates
//! `addr + width <= RAM_SIZE` before touching the backing array, and reports
//! the offending address and width rather than panicking.

use crate::consts::RAM_SIZE;
use crate::error::Fault;

/// The machine's 64 KiB address space.
pub struct Ram {
    bytes: Box<[u8; RAM_SIZE]>,
}

impl Ram {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0u8; RAM_SIZE]),
        }
    }

    /// Raw byte slice, for host tooling (ROM loading, debug dumps).
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.bytes.as_mut_slice()
    }

    fn bounds_check(addr: u16, width: u16) -> Result<(), Fault> {
        if (addr as u32) + (width as u32) > RAM_SIZE as u32 {
            return Err(Fault::BadAddress {
                addr,
                width: width as u8,
            });
        }
        Ok(())
    }

    pub fn load_u8(&self, addr: u16) -> Result<u8, Fault> {
        Self::bounds_check(addr, 1)?;
        Ok(self.bytes[addr as usize])
    }

    pub fn store_u8(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        Self::bounds_check(addr, 1)?;
        self.bytes[addr as usize] = value;
        Ok(())
    }

    pub fn load_u16(&self, addr: u16) -> Result<u16, Fault> {
        Self::bounds_check(addr, 2)?;
        let start = addr as usize;
        Ok(u16::from_le_bytes([self.bytes[start], self.bytes[start + 1]]))
    }

    pub fn store_u16(&mut self, addr: u16, value: u16) -> Result<(), Fault> {
        Self::bounds_check(addr, 2)?;
        let start = addr as usize;
        self.bytes[start..start + 2].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn load_u32(&self, addr: u16) -> Result<u32, Fault> {
        Self::bounds_check(addr, 4)?;
        let start = addr as usize;
        Ok(u32::from_le_bytes(
            self.bytes[start..start + 4].try_into().expect("checked width"),
        ))
    }

    pub fn store_u32(&mut self, addr: u16, value: u32) -> Result<(), Fault> {
        Self::bounds_check(addr, 4)?;
        let start = addr as usize;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Load an `i32` word (signed view of [`Ram::load_u32`]).
    pub fn load_i32(&self, addr: u16) -> Result<i32, Fault> {
        self.load_u32(addr).map(|v| v as i32)
    }

    pub fn store_i32(&mut self, addr: u16, value: i32) -> Result<(), Fault> {
        self.store_u32(addr, value as u32)
    }

    /// Copy `image` into the heap starting at `HEAP_BASE`. Returns
    /// [`Fault::BootOverflow`] if it would run past `HEAP_MAX`.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), Fault> {
        if image.len() > crate::consts::HEAP_MAX as usize + 1 {
            return Err(Fault::BootOverflow { size: image.len() });
        }
        self.bytes[..image.len()].copy_from_slice(image);
        Ok(())
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halfword_round_trips_little_endian() {
        let mut ram = Ram::new();
        ram.store_u16(10, 0xBEEF).unwrap();
        assert_eq!(ram.load_u8(10).unwrap(), 0xEF);
        assert_eq!(ram.load_u8(11).unwrap(), 0xBE);
        assert_eq!(ram.load_u16(10).unwrap(), 0xBEEF);
    }

    #[test]
    fn word_store_near_the_top_is_rejected() {
        let mut ram = Ram::new();
        assert!(ram.store_u32(u16::MAX, 1).is_err());
        assert!(ram.store_u16(u16::MAX, 1).is_err());
        assert!(ram.store_u8(u16::MAX, 1).is_ok());
    }

    #[test]
    fn boot_image_larger_than_the_heap_is_rejected() {
        let mut ram = Ram::new();
        let oversized = vec![0u8; crate::consts::HEAP_MAX as usize + 2];
        assert!(matches!(
            ram.load_image(&oversized),
            Err(Fault::BootOverflow { .. })
        ));
    }
}
