//! Reads the optional sidecar `.symbols` file a ROM may ship next to it —
//! one `address name` pair per line, as `markab-compiler`'s `rom` module
//! writes them. Used only for diagnostics; the VM never consults it.

use std::collections::HashMap;
use std::path::Path;

/// Best-effort load: a missing file is not an error, a malformed line is
/// skipped rather than aborting the whole table.
pub fn load_sidecar(rom_path: &Path) -> HashMap<u16, String> {
    let symbols_path = rom_path.with_extension("symbols");
    let Ok(text) = std::fs::read_to_string(&symbols_path) else {
        return HashMap::new();
    };

    let mut table = HashMap::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(addr_text), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(hex) = addr_text.strip_prefix("0x") else {
            continue;
        };
        if let Ok(addr) = u16::from_str_radix(hex, 16) {
            table.insert(addr, name.to_string());
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sidecar_yields_an_empty_table() {
        let table = load_sidecar(Path::new("/nonexistent/kernel.rom"));
        assert!(table.is_empty());
    }

    #[test]
    fn parses_address_name_pairs() {
        let dir = std::env::temp_dir().join("markab-cli-symbols-test");
        std::fs::create_dir_all(&dir).unwrap();
        let rom_path = dir.join("kernel.rom");
        std::fs::write(dir.join("kernel.symbols"), "0x0010 boot\n0x0020 outer\n").unwrap();
        let table = load_sidecar(&rom_path);
        assert_eq!(table.get(&0x0010), Some(&"boot".to_string()));
        assert_eq!(table.get(&0x0020), Some(&"outer".to_string()));
    }
}
