//! Jumps, calls, and the two conditional/loop back-branches. Grounded on
//! `fuel-vm/src/interpreter/flow.rs` (jump/call dispatch) and
//! `fuel-vm/src/interpreter/frame.rs` (pushing a return address before
//! transferring control).

use crate::error::Fault;
use crate::state::ExecuteState;

use super::Interpreter;

/// `JMP`: `$pc += offset`, a signed 16-bit value relative to the address of
/// the byte right after the offset field.
pub(super) fn jmp(vm: &mut Interpreter) -> Result<(), Fault> {
    let offset = vm.fetch_u16()? as i16;
    vm.regs.pc = vm.regs.pc.wrapping_add(offset as u16);
    Ok(())
}

/// `JAL`: same offset semantics as `JMP`, but first pushes the post-offset
/// address onto the return stack.
pub(super) fn jal(vm: &mut Interpreter) -> Result<(), Fault> {
    let offset = vm.fetch_u16()? as i16;
    let return_addr = vm.regs.pc;
    vm.push_return(return_addr as i32)?;
    vm.regs.pc = vm.regs.pc.wrapping_add(offset as u16);
    Ok(())
}

/// `CALL`: pop `$t` as an absolute address, push the current `$pc` as the
/// return address, and jump.
pub(super) fn call(vm: &mut Interpreter) -> Result<(), Fault> {
    let target = vm.data.pop()? as u16;
    let return_addr = vm.regs.pc;
    vm.push_return(return_addr as i32)?;
    vm.regs.pc = target;
    Ok(())
}

/// `RET`: pop the return stack into `$pc`. An empty return stack ends the
/// outermost call into the step loop rather than faulting — this is simply
/// the outermost word returning.
pub(super) fn ret(vm: &mut Interpreter) -> Result<ExecuteState, Fault> {
    match vm.ret.pop() {
        Ok(addr) => {
            vm.regs.pc = addr as u16;
            Ok(ExecuteState::Proceed)
        }
        Err(Fault::RUnder) => Ok(ExecuteState::Returned),
        Err(other) => Err(other),
    }
}

/// `BZ`: drop `$t`; branch forward by an unsigned 8-bit offset, counted from
/// the address of the offset byte itself, if it was zero; otherwise fall
/// into the body immediately following the offset byte.
pub(super) fn bz(vm: &mut Interpreter) -> Result<(), Fault> {
    let t = vm.data.pop()?;
    let offset_addr = vm.regs.pc;
    let offset = vm.fetch_u8()?;
    if t == 0 {
        vm.regs.pc = offset_addr.wrapping_add(offset as u16);
    }
    Ok(())
}

/// `BFOR`: decrement `$r`; loop back by an unsigned 8-bit offset, counted
/// from the address of the offset byte itself, while it stays non-negative;
/// otherwise fall through and drop `$r`.
pub(super) fn bfor(vm: &mut Interpreter) -> Result<(), Fault> {
    let r = vm.ret.r()?.wrapping_sub(1);
    vm.ret.set_r(r)?;
    let offset_addr = vm.regs.pc;
    let offset = vm.fetch_u8()?;
    if r >= 0 {
        vm.regs.pc = offset_addr.wrapping_sub(offset as u16);
    } else {
        vm.ret.pop()?;
    }
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
    fn bz_skips_forward_only_when_top_is_zero() {
        let mut vm = vm();
        vm.regs.pc = 0;
        vm.ram_mut().store_u8(0, 5).unwrap();
        vm.data.push(0).unwrap();
        bz(&mut vm).unwrap();
        // Offset counts from the offset byte's own address (0), not from
        // the address after it.
        assert_eq!(vm.regs.pc, 5);
    }

    #[test]
    fn bz_falls_through_when_top_is_nonzero() {
        let mut vm = vm();
        vm.regs.pc = 0;
        vm.ram_mut().store_u8(0, 5).unwrap();
        vm.data.push(1).unwrap();
        bz(&mut vm).unwrap();
        assert_eq!(vm.regs.pc, 1);
    }

    #[test]
    fn bfor_loops_back_until_the_counter_goes_negative() {
        let mut vm = vm();
        vm.ret.push(1).unwrap();
        vm.regs.pc = 10;
        vm.ram_mut().store_u8(10, 4).unwrap();
        bfor(&mut vm).unwrap();
        // Offset counts back from the offset byte's own address (10), not
        // from the address after it.
        assert_eq!(vm.regs.pc, 6);
        assert_eq!(vm.ret.r().unwrap(), 0);

        vm.regs.pc = 10;
        vm.ram_mut().store_u8(10, 4).unwrap();
        bfor(&mut vm).unwrap();
        assert_eq!(vm.regs.pc, 11);
        assert!(vm.ret.pop().is_err());
    }

    #[test]
    fn ret_on_empty_return_stack_ends_the_call() {
        let mut vm = vm();
        assert_eq!(ret(&mut vm).unwrap(), ExecuteState::Returned);
    }

    /// Drives the literal branch-taken scenario through the real
    /// fetch-dispatch loop (not a hand-set `$pc`), so a wrong offset base
    /// in `bz` would actually decode a bogus opcode and fail here.
    #[test]
    fn branch_taken_scenario_lands_on_the_true_literal() {
        use crate::state::ProgramState;
        use markab_asm::Opcode;
        // U8,0, BZ,3, U8,7, U8,9, RET
        let image = [
            u8::from(Opcode::U8),
            0,
            u8::from(Opcode::Bz),
            3,
            u8::from(Opcode::U8),
            7,
            u8::from(Opcode::U8),
            9,
            u8::from(Opcode::Ret),
        ];
        let mut vm = vm();
        assert_eq!(vm.boot(&image).unwrap(), ProgramState::Returned);
        assert_eq!(vm.data_stack().depth(), 1);
        assert_eq!(vm.data_stack().t().unwrap(), 9);
    }

    /// Drives the literal counted-loop scenario through the real
    /// fetch-dispatch loop, so a wrong offset base in `bfor` would either
    /// never loop back or land on the wrong byte.
    #[test]
    fn counted_loop_scenario_counts_down_to_zero() {
        use crate::state::ProgramState;
        use markab_asm::Opcode;
        // U8,2, MTR, R, BFOR,2, RET
        let image = [
            u8::from(Opcode::U8),
            2,
            u8::from(Opcode::Mtr),
            u8::from(Opcode::R),
            u8::from(Opcode::Bfor),
            2,
            u8::from(Opcode::Ret),
        ];
        let mut vm = vm();
        assert_eq!(vm.boot(&image).unwrap(), ProgramState::Returned);
        let values: Vec<i32> = vm.data_stack().iter_bottom_up().collect();
        assert_eq!(values, vec![2, 1, 0]);
        assert_eq!(vm.return_stack().depth(), 0);
    }
}
