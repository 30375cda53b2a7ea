//! Final ROM image and sidecar symbol file, written once compilation
//! reaches a fixed point. Grounded on SPEC_FULL.md's "End of compile"
//! rule: the DP initializer cell is patched last, then bytes `0..DP` of the
//! target memory are the image.

use itertools::Itertools;
use markab_vm::Interpreter;

/// Copy bytes `0..len` out of `vm`'s memory as the final ROM image.
pub fn extract_image(vm: &Interpreter, len: u16) -> Vec<u8> {
    (0..len).map(|addr| vm.read_u8(addr).expect("len is within the heap")).collect()
}

/// Render `address name` pairs, sorted by address, one per line.
pub fn render_symbols(entries: &[(u16, String)]) -> String {
    entries
        .iter()
        .sorted_by_key(|(addr, _)| *addr)
        .map(|(addr, name)| format!("{addr:#06x} {name}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_sorted_by_address() {
        let entries = vec![(0x20, "b".to_string()), (0x10, "a".to_string())];
        let rendered = render_symbols(&entries);
        assert!(rendered.find("0x0010 a").unwrap() < rendered.find("0x0020 b").unwrap());
    }
}
