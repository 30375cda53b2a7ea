//! Path validation and the two opcodes that touch the filesystem.
//! Grounded on the bounds/ownership-check shape of
//! `fuel-vm/src/interpreter/contract.rs` (validate fully before doing
//! anything observable), using `regex` for the allow-list the same way
//! `markab-vm`'s own `VmConfig` does.

use std::path::{Path, PathBuf};

use crate::error::Fault;

use super::Interpreter;

/// A Markab string is a length byte followed by that many raw bytes.
fn read_counted_string(vm: &Interpreter, addr: u16) -> Result<Vec<u8>, Fault> {
    let len = vm.ram.load_u8(addr)?;
    let mut bytes = Vec::with_capacity(len as usize);
    for i in 0..len {
        bytes.push(vm.ram.load_u8(addr.wrapping_add(1).wrapping_add(i as u16))?);
    }
    Ok(bytes)
}

fn resolve_and_check(
    working_dir: &Path,
    allowlist: &[regex::Regex],
    raw_path: &str,
) -> Result<PathBuf, Fault> {
    let reject = || Fault::FilePerms {
        path: raw_path.to_owned(),
    };

    if !allowlist.iter().any(|pattern| pattern.is_match(raw_path)) {
        return Err(reject());
    }

    let candidate = working_dir.join(raw_path);
    let canonical_dir = working_dir.canonicalize().map_err(|_| reject())?;

    // The target need not exist yet (IOSAVE writes a new file), so only the
    // parent directory has to canonicalize and stay inside the working
    // directory.
    let parent = candidate.parent().unwrap_or(working_dir);
    let canonical_parent = parent.canonicalize().map_err(|_| reject())?;
    if !canonical_parent.starts_with(&canonical_dir) {
        return Err(reject());
    }

    Ok(candidate)
}

/// `IOLOAD`: validate the path named by the counted string at `$t`, read it,
/// and feed each line through the receive-line interrupt as if the host had
/// typed it, subject to the nesting-depth limit.
pub(super) fn ioload(vm: &mut Interpreter) -> Result<(), Fault> {
    let addr = vm.data.pop()? as u16;
    let name_bytes = read_counted_string(vm, addr)?;
    let raw_path = String::from_utf8_lossy(&name_bytes).into_owned();

    if vm.regs.ioload_depth >= vm.config.max_ioload_depth {
        return Err(Fault::IoloadDepth {
            max: vm.config.max_ioload_depth,
        });
    }

    let path = resolve_and_check(&vm.config.working_dir, &vm.config.load_allowlist, &raw_path)?;
    let contents = std::fs::read(&path).map_err(|_| Fault::FileNotFound { path: raw_path })?;

    vm.regs.ioload_depth += 1;
    let mut failed = None;
    for line in contents.split(|&b| b == b'\n') {
        if let Err(fault) = super::boot::feed_line(vm, line) {
            failed = Some(fault);
            break;
        }
    }
    vm.regs.ioload_depth -= 1;

    match failed {
        Some(fault) => {
            vm.regs.ioload_failed = true;
            Err(fault)
        }
        None => Ok(()),
    }
}

/// `IOSAVE`: validate the path named by the counted string at `$t` against
/// the save allow-list and working-directory containment policy. Nothing
/// beyond the check is performed; there is no running kernel state this
/// crate could serialize back into a ROM on its own.
pub(super) fn iosave(vm: &mut Interpreter) -> Result<(), Fault> {
    let addr = vm.data.pop()? as u16;
    let name_bytes = read_counted_string(vm, addr)?;
    let raw_path = String::from_utf8_lossy(&name_bytes).into_owned();
    resolve_and_check(&vm.config.working_dir, &vm.config.save_allowlist, &raw_path)?;
    Ok(())
}

/// The six reserved file-descriptor opcodes (`FOPEN`..`FCLOSE`) have no
/// defined runtime behavior; dispatch reaching one is always a programming
/// error in the calling ROM.
pub(super) fn reserved(pc: u16, byte: u8) -> Fault {
    Fault::BadInstruction { pc, byte }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;

    fn vm_with_tmp_dir() -> (Interpreter, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = VmConfig::new(1000, &[r".+\.mkb$"], &[r"^out\.rom$"], dir.path().to_owned(), 1, false).unwrap();
        (Interpreter::new(config), dir)
    }

    fn write_counted_string(vm: &mut Interpreter, addr: u16, text: &str) {
        vm.ram.store_u8(addr, text.len() as u8).unwrap();
        for (i, byte) in text.bytes().enumerate() {
            vm.ram.store_u8(addr + 1 + i as u16, byte).unwrap();
        }
    }

    #[test]
    fn ioload_rejects_a_path_outside_the_allowlist() {
        let (mut vm, _dir) = vm_with_tmp_dir();
        write_counted_string(&mut vm, 0, "secrets.txt");
        vm.data.push(0).unwrap();
        assert!(matches!(ioload(&mut vm), Err(Fault::FilePerms { .. })));
    }

    #[test]
    fn ioload_loads_and_runs_an_allowed_file() {
        let (mut vm, dir) = vm_with_tmp_dir();
        std::fs::write(dir.path().join("boot.mkb"), b"hi\n").unwrap();
        write_counted_string(&mut vm, 0, "boot.mkb");
        vm.data.push(0).unwrap();
        ioload(&mut vm).unwrap();
    }

    #[test]
    fn iosave_checks_the_save_allowlist_without_writing() {
        let (mut vm, dir) = vm_with_tmp_dir();
        write_counted_string(&mut vm, 0, "out.rom");
        vm.data.push(0).unwrap();
        iosave(&mut vm).unwrap();
        assert!(!dir.path().join("out.rom").exists());
    }
}
