//! Arithmetic, logic, and comparison opcodes. All of them pop `$t` (and, for
//! the binary ones, `$s`) and push exactly one result, so each is a plain
//! `(i32, i32) -> i32` or `i32 -> i32` function threaded through the data
//! stack. Grounded on the dispatch shape of
//! `fuel-vm/src/interpreter/alu.rs`, which does the same pop-compute-push
//! dance over its register file.

use crate::error::Fault;

use super::Interpreter;

/// `-1` for Markab's boolean true, `0` for false — there is no separate bool
/// type, only the all-ones/all-zero convention every comparison opcode uses.
const TRUE: i32 = -1;
const FALSE: i32 = 0;

fn binary(vm: &mut Interpreter, f: impl FnOnce(i32, i32) -> i32) -> Result<(), Fault> {
    let t = vm.data.pop()?;
    let s = vm.data.pop()?;
    vm.push_data(f(s, t))?;
    Ok(())
}

fn binary_checked(vm: &mut Interpreter, f: impl FnOnce(i32, i32) -> Option<i32>) -> Result<(), Fault> {
    let t = vm.data.pop()?;
    let s = vm.data.pop()?;
    vm.push_data(f(s, t).unwrap_or(0))?;
    Ok(())
}

fn unary(vm: &mut Interpreter, f: impl FnOnce(i32) -> i32) -> Result<(), Fault> {
    let t = vm.data.t()?;
    vm.data.set_t(f(t))
}

pub(super) fn add(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s.wrapping_add(t))
}

pub(super) fn sub(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s.wrapping_sub(t))
}

pub(super) fn mul(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s.wrapping_mul(t))
}

pub(super) fn div(vm: &mut Interpreter) -> Result<(), Fault> {
    binary_checked(vm, |s, t| s.checked_div(t))
}

pub(super) fn modulo(vm: &mut Interpreter) -> Result<(), Fault> {
    binary_checked(vm, |s, t| s.checked_rem(t))
}

pub(super) fn and(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s & t)
}

pub(super) fn or(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s | t)
}

pub(super) fn xor(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s ^ t)
}

pub(super) fn sll(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s.wrapping_shl(t as u32 & 31))
}

pub(super) fn srl(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| ((s as u32).wrapping_shr(t as u32 & 31)) as i32)
}

pub(super) fn sra(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| s.wrapping_shr(t as u32 & 31))
}

pub(super) fn inv(vm: &mut Interpreter) -> Result<(), Fault> {
    unary(vm, |t| !t)
}

pub(super) fn inc(vm: &mut Interpreter) -> Result<(), Fault> {
    unary(vm, |t| t.wrapping_add(1))
}

pub(super) fn dec(vm: &mut Interpreter) -> Result<(), Fault> {
    unary(vm, |t| t.wrapping_sub(1))
}

pub(super) fn ze(vm: &mut Interpreter) -> Result<(), Fault> {
    unary(vm, |t| if t == 0 { TRUE } else { FALSE })
}

pub(super) fn eq(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| if s == t { TRUE } else { FALSE })
}

pub(super) fn gt(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| if s > t { TRUE } else { FALSE })
}

pub(super) fn lt(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| if s < t { TRUE } else { FALSE })
}

pub(super) fn ne(vm: &mut Interpreter) -> Result<(), Fault> {
    binary(vm, |s, t| if s != t { TRUE } else { FALSE })
}

pub(super) fn push_true(vm: &mut Interpreter) -> Result<(), Fault> {
    vm.push_data(TRUE)
}

pub(super) fn push_false(vm: &mut Interpreter) -> Result<(), Fault> {
    vm.push_data(FALSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;

    fn vm() -> Interpreter {
        Interpreter::new(VmConfig::default())
    }

    #[test]
    fn division_by_zero_yields_zero_rather_than_a_fault() {
        let mut vm = vm();
        vm.data.push(10).unwrap();
        vm.data.push(0).unwrap();
        div(&mut vm).unwrap();
        assert_eq!(vm.data.pop().unwrap(), 0);
    }

    #[test]
    fn comparisons_use_all_ones_for_true() {
        let mut vm = vm();
        vm.data.push(3).unwrap();
        vm.data.push(4).unwrap();
        lt(&mut vm).unwrap();
        assert_eq!(vm.data.pop().unwrap(), -1);
    }

    #[test]
    fn shifts_mask_the_count_to_5_bits() {
        let mut vm = vm();
        vm.data.push(1).unwrap();
        vm.data.push(33).unwrap();
        sll(&mut vm).unwrap();
        assert_eq!(vm.data.pop().unwrap(), 2);
    }
}
