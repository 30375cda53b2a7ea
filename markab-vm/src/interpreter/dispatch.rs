//! Fetch-decode-execute. Grounded on the opcode `match` in
//! `fuel-vm/src/interpreter/executors/instruction.rs`: one arm per opcode,
//! each arm a short call into the module that owns that family of
//! behavior.

use markab_asm::Opcode;

use crate::error::Fault;
use crate::state::ExecuteState;

use super::{alu, control, fileio, io};
use super::Interpreter;

pub(super) fn step(vm: &mut Interpreter) -> Result<ExecuteState, Fault> {
    vm.fetch_pc_checked()?;
    let pc_at_fetch = vm.regs.pc;
    let byte = vm.ram.load_u8(pc_at_fetch)?;
    vm.regs.pc = vm.regs.pc.wrapping_add(1);

    let op = Opcode::try_from(byte).map_err(|byte| Fault::BadInstruction { pc: pc_at_fetch, byte })?;

    if vm.regs.trace {
        tracing::trace!(pc = pc_at_fetch, ?op, t = ?vm.data.t().ok(), "step");
    }
    vm.cycles_run += 1;

    match op {
        Opcode::Nop => Ok(ExecuteState::Proceed),
        Opcode::Jmp => control::jmp(vm).map(|_| ExecuteState::Proceed),
        Opcode::Jal => control::jal(vm).map(|_| ExecuteState::Proceed),
        Opcode::Call => control::call(vm).map(|_| ExecuteState::Proceed),
        Opcode::Ret => control::ret(vm),
        Opcode::Bz => control::bz(vm).map(|_| ExecuteState::Proceed),
        Opcode::Bfor => control::bfor(vm).map(|_| ExecuteState::Proceed),
        Opcode::Halt => {
            vm.regs.halted = true;
            Ok(ExecuteState::Halted)
        }
        Opcode::Reset => {
            vm.data.clear();
            vm.ret.clear();
            vm.regs.reset_soft();
            Ok(ExecuteState::Proceed)
        }

        Opcode::U8 => {
            let value = vm.fetch_u8()? as i32;
            vm.push_data(value).map(|_| ExecuteState::Proceed)
        }
        Opcode::U16 => {
            let value = vm.fetch_u16()? as i32;
            vm.push_data(value).map(|_| ExecuteState::Proceed)
        }
        Opcode::I32 => {
            let value = vm.fetch_i32()?;
            vm.push_data(value).map(|_| ExecuteState::Proceed)
        }

        Opcode::Lb => {
            let addr = vm.data.t()? as u16;
            let byte = vm.ram.load_u8(addr)?;
            vm.data.set_t(byte as i32).map(|_| ExecuteState::Proceed)
        }
        Opcode::Sb => {
            let addr = vm.data.pop()? as u16;
            let value = vm.data.pop()? as u8;
            vm.ram.store_u8(addr, value).map(|_| ExecuteState::Proceed)
        }
        Opcode::Lh => {
            let addr = vm.data.t()? as u16;
            let value = vm.ram.load_u16(addr)?;
            vm.data.set_t(value as i32).map(|_| ExecuteState::Proceed)
        }
        Opcode::Sh => {
            let addr = vm.data.pop()? as u16;
            let value = vm.data.pop()? as u16;
            vm.ram.store_u16(addr, value).map(|_| ExecuteState::Proceed)
        }
        Opcode::Lw => {
            let addr = vm.data.t()? as u16;
            let value = vm.ram.load_i32(addr)?;
            vm.data.set_t(value).map(|_| ExecuteState::Proceed)
        }
        Opcode::Sw => {
            let addr = vm.data.pop()? as u16;
            let value = vm.data.pop()?;
            vm.ram.store_i32(addr, value).map(|_| ExecuteState::Proceed)
        }

        Opcode::Add => alu::add(vm).map(|_| ExecuteState::Proceed),
        Opcode::Sub => alu::sub(vm).map(|_| ExecuteState::Proceed),
        Opcode::Mul => alu::mul(vm).map(|_| ExecuteState::Proceed),
        Opcode::Div => alu::div(vm).map(|_| ExecuteState::Proceed),
        Opcode::Mod => alu::modulo(vm).map(|_| ExecuteState::Proceed),
        Opcode::And => alu::and(vm).map(|_| ExecuteState::Proceed),
        Opcode::Or => alu::or(vm).map(|_| ExecuteState::Proceed),
        Opcode::Xor => alu::xor(vm).map(|_| ExecuteState::Proceed),
        Opcode::Sll => alu::sll(vm).map(|_| ExecuteState::Proceed),
        Opcode::Srl => alu::srl(vm).map(|_| ExecuteState::Proceed),
        Opcode::Sra => alu::sra(vm).map(|_| ExecuteState::Proceed),

        Opcode::Inv => alu::inv(vm).map(|_| ExecuteState::Proceed),
        Opcode::Inc => alu::inc(vm).map(|_| ExecuteState::Proceed),
        Opcode::Dec => alu::dec(vm).map(|_| ExecuteState::Proceed),
        Opcode::Ze => alu::ze(vm).map(|_| ExecuteState::Proceed),

        Opcode::Eq => alu::eq(vm).map(|_| ExecuteState::Proceed),
        Opcode::Gt => alu::gt(vm).map(|_| ExecuteState::Proceed),
        Opcode::Lt => alu::lt(vm).map(|_| ExecuteState::Proceed),
        Opcode::Ne => alu::ne(vm).map(|_| ExecuteState::Proceed),
        Opcode::True => alu::push_true(vm).map(|_| ExecuteState::Proceed),
        Opcode::False => alu::push_false(vm).map(|_| ExecuteState::Proceed),

        Opcode::Drop => vm.data.pop().map(|_| ExecuteState::Proceed),
        Opcode::Dup => {
            let t = vm.data.t()?;
            vm.push_data(t).map(|_| ExecuteState::Proceed)
        }
        Opcode::Over => {
            let s = vm.data.s()?;
            vm.push_data(s).map(|_| ExecuteState::Proceed)
        }
        Opcode::Swap => {
            let t = vm.data.pop()?;
            let s = vm.data.pop()?;
            vm.push_data(t)?;
            vm.push_data(s).map(|_| ExecuteState::Proceed)
        }
        Opcode::Mtr => {
            let t = vm.data.pop()?;
            vm.push_return(t).map(|_| ExecuteState::Proceed)
        }
        Opcode::Rdrop => vm.ret.pop().map(|_| ExecuteState::Proceed),
        Opcode::R => {
            let r = vm.ret.r()?;
            vm.push_data(r).map(|_| ExecuteState::Proceed)
        }
        Opcode::Pc => vm.push_data(vm.regs.pc as i32).map(|_| ExecuteState::Proceed),
        Opcode::Mte => {
            let t = vm.data.pop()?;
            let code = t as u8;
            vm.regs.err = code;
            Err(Fault::Raised(code))
        }

        Opcode::Mta => io::mta(vm).map(|_| ExecuteState::Proceed),
        Opcode::Mtb => io::mtb(vm).map(|_| ExecuteState::Proceed),
        Opcode::A => io::push_a(vm).map(|_| ExecuteState::Proceed),
        Opcode::B => io::push_b(vm).map(|_| ExecuteState::Proceed),
        Opcode::Ainc => {
            io::ainc(vm);
            Ok(ExecuteState::Proceed)
        }
        Opcode::Adec => {
            io::adec(vm);
            Ok(ExecuteState::Proceed)
        }
        Opcode::Binc => {
            io::binc(vm);
            Ok(ExecuteState::Proceed)
        }
        Opcode::Bdec => {
            io::bdec(vm);
            Ok(ExecuteState::Proceed)
        }
        Opcode::Lba => io::lba(vm).map(|_| ExecuteState::Proceed),
        Opcode::Lbb => io::lbb(vm).map(|_| ExecuteState::Proceed),
        Opcode::Lbai => io::lbai(vm).map(|_| ExecuteState::Proceed),
        Opcode::Lbbi => io::lbbi(vm).map(|_| ExecuteState::Proceed),
        Opcode::Sbbi => io::sbbi(vm).map(|_| ExecuteState::Proceed),

        Opcode::Iokey => io::iokey(vm).map(|_| ExecuteState::Proceed),
        Opcode::Ioemit => io::ioemit(vm).map(|_| ExecuteState::Proceed),
        Opcode::Iodot => io::iodot(vm).map(|_| ExecuteState::Proceed),
        Opcode::Iod => io::iod(vm).map(|_| ExecuteState::Proceed),
        Opcode::Iodh => io::iodh(vm).map(|_| ExecuteState::Proceed),
        Opcode::Iorh => io::iorh(vm).map(|_| ExecuteState::Proceed),
        Opcode::Iodump => io::iodump(vm).map(|_| ExecuteState::Proceed),
        Opcode::Tron => {
            io::tron(vm);
            Ok(ExecuteState::Proceed)
        }
        Opcode::Troff => {
            io::troff(vm);
            Ok(ExecuteState::Proceed)
        }
        Opcode::Ioload => fileio::ioload(vm).map(|_| ExecuteState::Proceed),
        Opcode::Iosave => fileio::iosave(vm).map(|_| ExecuteState::Proceed),

        Opcode::Fopen
        | Opcode::Fread
        | Opcode::Fwrite
        | Opcode::Fseek
        | Opcode::Ftell
        | Opcode::Ftrunc
        | Opcode::Fclose => Err(fileio::reserved(pc_at_fetch, byte)),

        // `Opcode` is `#[non_exhaustive]`; all variants are handled above.
        _ => unreachable!("Opcode::try_from only yields defined variants"),
    }
}
