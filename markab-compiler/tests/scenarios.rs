//! End-to-end compile scenarios, driven only through `Compiler`'s public
//! surface: source text in, a ROM image and symbol table out.

use markab_asm::Opcode;
use markab_compiler::Compiler;
use markab_vm::VmConfig;

fn symbol_addr(symbols: &[(u16, String)], name: &str) -> u16 {
    symbols
        .iter()
        .find(|(_, n)| n == name)
        .unwrap_or_else(|| panic!("no symbol named {name:?}"))
        .0
}

/// `payload_offset` for a one-character name: link(2) + name_len(1) + "X"(1)
/// + type(1) = 5.
fn body_start_of(rom: &[u8], symbols: &[(u16, String)], name: &str) -> usize {
    let entry = symbol_addr(symbols, name) as usize;
    entry + 2 + 1 + name.len() + 1
}

#[test]
fn a_tail_call_closing_a_definition_becomes_a_plain_jump() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    compiler.compile_str(": A 1 ; : B A ;").unwrap();
    let out = compiler.finish().unwrap();

    let b_body = body_start_of(&out.rom, &out.symbols, "B");
    assert_eq!(out.rom[b_body], Opcode::Jmp as u8, "B's call to A should have been rewritten to a JMP");

    // The return stack must not grow across the tail call: B never returns
    // to itself, it falls straight out through A's own RET.
    let a_body = body_start_of(&out.rom, &out.symbols, "A");
    assert_eq!(out.rom[a_body + 2], Opcode::Ret as u8);
}

#[test]
fn a_non_tail_reference_keeps_its_jal_and_gets_a_trailing_ret() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    compiler.compile_str(": A 1 ; : B A 2 ;").unwrap();
    let out = compiler.finish().unwrap();

    let b_body = body_start_of(&out.rom, &out.symbols, "B");
    assert_eq!(out.rom[b_body], Opcode::Jal as u8, "the call to A is not B's last action, so it stays a JAL");
    // JAL (3 bytes) + U8,2 (2 bytes) + RET.
    assert_eq!(out.rom[b_body + 5], Opcode::Ret as u8);
}

#[test]
fn an_if_block_compiles_a_forward_branch_over_its_body() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    compiler.compile_str(": f if{ 9 }if ;").unwrap();
    let out = compiler.finish().unwrap();

    let body = body_start_of(&out.rom, &out.symbols, "f");
    assert_eq!(out.rom[body], Opcode::Bz as u8);
    // BZ's offset counts from its own offset byte (body + 1) to the RET at
    // body + 4, skipping the two bytes of `9`'s U8 literal: distance 3.
    assert_eq!(out.rom[body + 1], 3);
    assert_eq!(out.rom[body + 2], Opcode::U8 as u8);
    assert_eq!(out.rom[body + 3], 9);
    assert_eq!(out.rom[body + 4], Opcode::Ret as u8);
}

#[test]
fn a_const_reference_compiles_a_minimal_width_literal() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    compiler.compile_str("300 const wide : f wide ;").unwrap();
    let out = compiler.finish().unwrap();

    let body = body_start_of(&out.rom, &out.symbols, "f");
    assert_eq!(out.rom[body], Opcode::U16 as u8, "300 does not fit in a U8 literal");
    assert_eq!(u16::from_le_bytes([out.rom[body + 1], out.rom[body + 2]]), 300);
}

#[test]
fn an_opcode_word_compiles_to_its_single_byte() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    compiler.compile_str("18 opcode plus : f plus ;").unwrap();
    let out = compiler.finish().unwrap();

    let body = body_start_of(&out.rom, &out.symbols, "f");
    assert_eq!(out.rom[body], Opcode::Add as u8);
    assert_eq!(out.rom[body + 1], Opcode::Ret as u8);
}

#[test]
fn referencing_an_unknown_word_is_reported() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    let err = compiler.compile_str(": f nonexistent ;").unwrap_err();
    assert!(err.to_string().contains("nonexistent"));
}

#[test]
fn a_for_loop_branches_back_to_its_own_start() {
    let mut compiler = Compiler::new(VmConfig::default()).unwrap();
    compiler.compile_str(": f 3 for{ 1 }for ;").unwrap();
    let out = compiler.finish().unwrap();

    let body = body_start_of(&out.rom, &out.symbols, "f");
    // U8,3 (2 bytes), MTR (1), U8,1 (2), BFOR (1), offset (1), RET (1).
    assert_eq!(out.rom[body + 2], Opcode::Mtr as u8);
    assert_eq!(out.rom[body + 5], Opcode::Bfor as u8);
    // BFOR's offset counts back from its own offset byte (body + 6) to
    // loop_start (body + 3): distance 3.
    let loop_start = (body + 3) as i32;
    let offset_addr = (body + 6) as i32;
    assert_eq!(out.rom[body + 6] as i32, offset_addr - loop_start);
    assert_eq!(out.rom[body + 7], Opcode::Ret as u8);
}
