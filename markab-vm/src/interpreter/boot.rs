//! Warm boot, the receive-line interrupt, and the one-level-recursive error
//! handler that vectors a fault to `$irqerr` before giving up and escaping
//! to the host. Grounded on the initialization/vectoring shape of
//! `fuel-vm/src/interpreter/initialization.rs` and the
//! `ExecuteState`/`ProgramState` consumption loop in
//! `fuel-vm/src/interpreter/executors/main.rs::run_program`.

use crate::consts::HEAP_BASE;
use crate::error::{Fault, HostError};
use crate::state::{ExecuteState, ProgramState};

use super::Interpreter;

/// Run from the current `$pc` until it halts, returns, or faults. Does not
/// vector faults anywhere; that is [`run_with_error_vector`]'s job.
fn run_to_completion(vm: &mut Interpreter) -> Result<ProgramState, Fault> {
    vm.cycles_run = 0;
    loop {
        if vm.cycles_run >= vm.config.max_cycles {
            return Err(Fault::MaxCycles {
                limit: vm.config.max_cycles,
            });
        }
        match vm.step()? {
            ExecuteState::Proceed => continue,
            ExecuteState::Halted => return Ok(ProgramState::Halted),
            ExecuteState::Returned => return Ok(ProgramState::Returned),
        }
    }
}

/// Run to completion, vectoring at most one fault to `$irqerr` before
/// surfacing it to the host. A second fault while that handler is still
/// running escapes immediately: the error path itself is not allowed to
/// recurse.
pub(super) fn run_with_error_vector(vm: &mut Interpreter) -> Result<ProgramState, HostError> {
    match run_to_completion(vm) {
        Ok(state) => Ok(state),
        Err(fault) => vector_fault(vm, fault, false),
    }
}

/// Only overflow is specified to reset both stacks; underflow (and every
/// other fault code) leaves whatever state the program had built up alone.
fn fault_resets_stacks(fault: &Fault) -> bool {
    matches!(fault, Fault::DataOver | Fault::ROver)
}

fn vector_fault(vm: &mut Interpreter, fault: Fault, already_recovering: bool) -> Result<ProgramState, HostError> {
    vm.regs.err = fault.code();
    if vm.regs.ioload_depth > 0 {
        vm.regs.ioload_failed = true;
    }
    if already_recovering {
        return Err(HostError::UnhandledFault(fault));
    }
    let vector = vm.irqerr().map_err(HostError::UnhandledFault)?;
    if vector == 0 {
        return Err(HostError::UnhandledFault(fault));
    }
    if fault_resets_stacks(&fault) {
        vm.data.clear();
        vm.ret.clear();
    }
    vm.input.clear();
    vm.push_data(fault.code() as i32).map_err(HostError::UnhandledFault)?;
    vm.regs.pc = vector;
    match run_to_completion(vm) {
        Ok(state) => Ok(state),
        Err(second_fault) => vector_fault(vm, second_fault, true),
    }
}

/// Copy `image` to the heap base and run the boot prologue it starts with
/// to completion.
pub(super) fn boot(vm: &mut Interpreter, image: &[u8]) -> Result<ProgramState, HostError> {
    vm.ram
        .load_image(image)
        .map_err(|_| HostError::BootOverflow {
            size: image.len(),
            max: crate::consts::HEAP_MAX as usize + 1,
        })?;
    vm.data.clear();
    vm.ret.clear();
    vm.regs.pc = HEAP_BASE;
    run_with_error_vector(vm)
}

fn queue_line(vm: &mut Interpreter, line: &[u8]) {
    vm.input.extend(line.iter().copied());
    if line.last() != Some(&b'\n') {
        vm.input.push_back(b'\n');
    }
}

/// Queue `line`'s bytes (inserting a trailing newline if the caller didn't
/// already include one) and, if a handler is installed, vector once to
/// `$irqrx`. With no handler installed (`$irqrx == 0`) the bytes are simply
/// buffered for whenever the kernel does register one.
pub(super) fn receive_line(vm: &mut Interpreter, line: &[u8]) -> Result<ProgramState, HostError> {
    queue_line(vm, line);
    let vector = vm.irqrx().map_err(HostError::UnhandledFault)?;
    if vector == 0 {
        return Ok(ProgramState::Returned);
    }
    vm.regs.pc = vector;
    run_with_error_vector(vm)
}

/// Same as [`receive_line`] but surfaces faults as [`Fault`] rather than
/// [`HostError`], for `IOLOAD`'s internal, already-nested use: a failure
/// here is handled by the caller's own `$irqerr`, not escalated to the host
/// unless that vector is also absent.
pub(super) fn feed_line(vm: &mut Interpreter, line: &[u8]) -> Result<(), Fault> {
    queue_line(vm, line);
    let vector = vm.irqrx()?;
    if vector == 0 {
        return Ok(());
    }
    let saved_pc = vm.regs.pc;
    vm.regs.pc = vector;
    let result = run_to_completion(vm);
    vm.regs.pc = saved_pc;
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use markab_asm::Opcode;

    fn vm() -> Interpreter {
        Interpreter::new(VmConfig::default())
    }

    /// A trivial ROM: `HALT`.
    #[test]
    fn booting_a_halt_only_rom_reports_halted() {
        let mut vm = vm();
        let image = [u8::from(Opcode::Halt)];
        assert_eq!(vm.boot(&image).unwrap(), ProgramState::Halted);
        assert!(vm.halted());
    }

    /// A trivial ROM: `RET`.
    #[test]
    fn booting_a_ret_only_rom_reports_returned() {
        let mut vm = vm();
        let image = [u8::from(Opcode::Ret)];
        assert_eq!(vm.boot(&image).unwrap(), ProgramState::Returned);
    }

    #[test]
    fn an_infinite_loop_trips_the_cycle_budget() {
        let mut config = VmConfig::default();
        config.max_cycles = 10;
        let mut vm = Interpreter::new(config);
        // JMP -2 -> jumps back onto itself forever.
        let image = [u8::from(Opcode::Jmp), 0xfe, 0xff];
        let err = vm.boot(&image).unwrap_err();
        assert!(matches!(err, HostError::UnhandledFault(Fault::MaxCycles { .. })));
    }

    #[test]
    fn a_fault_vectors_to_irqerr_once() {
        let mut vm = vm();
        // irqerr points at a ROM that just halts, proving the vector ran.
        let handler_addr: u16 = 0x10;
        vm.ram.store_u16(crate::consts::IRQERR_ADDR, handler_addr).unwrap();
        vm.ram.store_u8(handler_addr, u8::from(Opcode::Halt)).unwrap();
        // RET on an empty return stack would just end peacefully, so force a
        // real fault: DROP on an empty data stack.
        let image = [u8::from(Opcode::Drop)];
        let outcome = vm.boot(&image).unwrap();
        assert_eq!(outcome, ProgramState::Halted);
        assert_eq!(vm.registers().err, Fault::DataUnder.code());
    }
}
