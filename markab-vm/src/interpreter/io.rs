//! Host-facing I/O and the `$a`/`$b` register-port opcodes used to stream
//! bytes through memory without re-pushing an address every time. Grounded
//! on the explicit-port-register pattern in
//! `fuel-vm/src/interpreter/memory.rs` (`$hp`/`$sp`-style dedicated address
//! registers rather than general-purpose ones for hot loops).

use crate::error::Fault;

use super::Interpreter;

pub(super) fn iokey(vm: &mut Interpreter) -> Result<(), Fault> {
    match vm.input.pop_front() {
        Some(byte) => {
            vm.push_data(byte as i32)?;
            vm.push_data(-1)
        }
        None => vm.push_data(0),
    }
}

pub(super) fn ioemit(vm: &mut Interpreter) -> Result<(), Fault> {
    let byte = vm.data.pop()? as u8;
    vm.output.push(byte);
    if byte == b'\n' {
        tracing::trace!(len = vm.output.len(), "flushing output buffer on newline");
    }
    Ok(())
}

pub(super) fn iodot(vm: &mut Interpreter) -> Result<(), Fault> {
    let value = vm.data.pop()?;
    vm.output.extend_from_slice(value.to_string().as_bytes());
    vm.output.push(b' ');
    Ok(())
}

fn dump_decimal(vm: &mut Interpreter, values: impl Iterator<Item = i32>) {
    for value in values {
        vm.output.extend_from_slice(value.to_string().as_bytes());
        vm.output.push(b' ');
    }
    vm.output.push(b'\n');
}

fn dump_hex(vm: &mut Interpreter, values: impl Iterator<Item = i32>) {
    for value in values {
        vm.output.extend_from_slice(format!("{:08x} ", value as u32).as_bytes());
    }
    vm.output.push(b'\n');
}

pub(super) fn iod(vm: &mut Interpreter) -> Result<(), Fault> {
    let values: Vec<i32> = vm.data.iter_bottom_up().collect();
    dump_decimal(vm, values.into_iter());
    Ok(())
}

pub(super) fn iodh(vm: &mut Interpreter) -> Result<(), Fault> {
    let values: Vec<i32> = vm.data.iter_bottom_up().collect();
    dump_hex(vm, values.into_iter());
    Ok(())
}

pub(super) fn iorh(vm: &mut Interpreter) -> Result<(), Fault> {
    let values: Vec<i32> = vm.ret.iter_bottom_up().collect();
    dump_hex(vm, values.into_iter());
    Ok(())
}

pub(super) fn iodump(vm: &mut Interpreter) -> Result<(), Fault> {
    let addr = vm.data.pop()? as u16;
    let len = vm.data.pop()? as u16;
    let mut line = String::new();
    for i in 0..len {
        let byte = vm.ram.load_u8(addr.wrapping_add(i))?;
        line.push_str(&format!("{byte:02x} "));
        if i % 16 == 15 {
            line.push('\n');
        }
    }
    if !line.ends_with('\n') {
        line.push('\n');
    }
    vm.output.extend_from_slice(line.as_bytes());
    Ok(())
}

pub(super) fn tron(vm: &mut Interpreter) {
    vm.regs.trace = true;
}

pub(super) fn troff(vm: &mut Interpreter) {
    vm.regs.trace = false;
}

// --- register ports ------------------------------------------------------

pub(super) fn mta(vm: &mut Interpreter) -> Result<(), Fault> {
    vm.regs.a = vm.data.pop()? as u16;
    Ok(())
}

pub(super) fn mtb(vm: &mut Interpreter) -> Result<(), Fault> {
    vm.regs.b = vm.data.pop()? as u16;
    Ok(())
}

pub(super) fn push_a(vm: &mut Interpreter) -> Result<(), Fault> {
    vm.push_data(vm.regs.a as i32)
}

pub(super) fn push_b(vm: &mut Interpreter) -> Result<(), Fault> {
    vm.push_data(vm.regs.b as i32)
}

pub(super) fn ainc(vm: &mut Interpreter) {
    vm.regs.a = vm.regs.a.wrapping_add(1);
}

pub(super) fn adec(vm: &mut Interpreter) {
    vm.regs.a = vm.regs.a.wrapping_sub(1);
}

pub(super) fn binc(vm: &mut Interpreter) {
    vm.regs.b = vm.regs.b.wrapping_add(1);
}

pub(super) fn bdec(vm: &mut Interpreter) {
    vm.regs.b = vm.regs.b.wrapping_sub(1);
}

pub(super) fn lba(vm: &mut Interpreter) -> Result<(), Fault> {
    let byte = vm.ram.load_u8(vm.regs.a)?;
    vm.push_data(byte as i32)
}

pub(super) fn lbb(vm: &mut Interpreter) -> Result<(), Fault> {
    let byte = vm.ram.load_u8(vm.regs.b)?;
    vm.push_data(byte as i32)
}

pub(super) fn lbai(vm: &mut Interpreter) -> Result<(), Fault> {
    let byte = vm.ram.load_u8(vm.regs.a)?;
    vm.regs.a = vm.regs.a.wrapping_add(1);
    vm.push_data(byte as i32)
}

pub(super) fn lbbi(vm: &mut Interpreter) -> Result<(), Fault> {
    let byte = vm.ram.load_u8(vm.regs.b)?;
    vm.regs.b = vm.regs.b.wrapping_add(1);
    vm.push_data(byte as i32)
}

pub(super) fn sbbi(vm: &mut Interpreter) -> Result<(), Fault> {
    let byte = vm.data.pop()? as u8;
    vm.ram.store_u8(vm.regs.b, byte)?;
    vm.regs.b = vm.regs.b.wrapping_add(1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;

    fn vm() -> Interpreter {
        Interpreter::new(VmConfig::default())
    }

    #[test]
    fn iokey_reports_empty_input_as_a_bare_zero() {
        let mut vm = vm();
        iokey(&mut vm).unwrap();
        assert_eq!(vm.data.pop().unwrap(), 0);
        assert_eq!(vm.data.depth(), 0);
    }

    #[test]
    fn iokey_pairs_a_byte_with_a_true_flag() {
        let mut vm = vm();
        vm.input.push_back(b'x');
        iokey(&mut vm).unwrap();
        assert_eq!(vm.data.pop().unwrap(), -1);
        assert_eq!(vm.data.pop().unwrap(), b'x' as i32);
    }

    #[test]
    fn lbbi_advances_b_after_reading() {
        let mut vm = vm();
        vm.ram.store_u8(100, 7).unwrap();
        vm.regs.b = 100;
        lbbi(&mut vm).unwrap();
        assert_eq!(vm.data.pop().unwrap(), 7);
        assert_eq!(vm.regs.b, 101);
    }
}
