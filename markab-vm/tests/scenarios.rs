//! End-to-end scenarios driven entirely through the public API: boot a hand
//! assembled ROM image, then interact with it the way a host front-end
//! would.

use markab_asm::Opcode;
use markab_vm::state::ProgramState;
use markab_vm::{Interpreter, VmConfig};

fn op(code: Opcode) -> u8 {
    u8::from(code)
}

#[test]
fn hello_world_rom_prints_a_sum_and_halts() {
    // U8 2, U8 3, ADD, IODOT, HALT
    let image = [
        op(Opcode::U8),
        2,
        op(Opcode::U8),
        3,
        op(Opcode::Add),
        op(Opcode::Iodot),
        op(Opcode::Halt),
    ];
    let mut vm = Interpreter::new(VmConfig::default());
    assert_eq!(vm.boot(&image).unwrap(), ProgramState::Halted);
    assert_eq!(vm.take_output(), b"5 ");
    assert_eq!(vm.data_stack().depth(), 0);
}

#[test]
fn receive_line_echoes_input_back_through_the_installed_vector() {
    // Boot prologue: seed $irqrx to point at the echo loop below it, then
    // RET back to the host. This is the same two-initializer shape the
    // compiler's boot prologue uses for every fixed vector cell.
    const LOOP_ADDR: u16 = 8;
    const IRQRX_ADDR: u16 = markab_vm::consts::IRQRX_ADDR;

    let mut image = vec![
        op(Opcode::U16),
    ];
    image.extend_from_slice(&LOOP_ADDR.to_le_bytes());
    image.push(op(Opcode::U16));
    image.extend_from_slice(&IRQRX_ADDR.to_le_bytes());
    image.push(op(Opcode::Sh));
    image.push(op(Opcode::Ret));

    assert_eq!(image.len(), LOOP_ADDR as usize);

    // Echo loop: IOKEY; BZ done; IOEMIT; JMP loop; done: RET
    image.push(op(Opcode::Iokey));
    image.push(op(Opcode::Bz));
    image.push(5); // BZ offset, counted from its own offset byte -> lands on the RET below IOEMIT+JMP
    image.push(op(Opcode::Ioemit));
    image.push(op(Opcode::Jmp));
    image.extend_from_slice(&(-7i16).to_le_bytes());
    image.push(op(Opcode::Ret));

    let mut vm = Interpreter::new(VmConfig::default());
    assert_eq!(vm.boot(&image).unwrap(), ProgramState::Returned);

    assert_eq!(vm.receive_line(b"hi").unwrap(), ProgramState::Returned);
    assert_eq!(vm.take_output(), b"hi\n");
}

#[test]
fn an_unhandled_fault_with_no_error_vector_escapes_to_the_host() {
    let image = [op(Opcode::Drop)];
    let mut vm = Interpreter::new(VmConfig::default());
    let err = vm.boot(&image).unwrap_err();
    assert!(format!("{err}").contains("unhandled fault"));
}
