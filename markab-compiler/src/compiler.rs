//! The single-pass assembler: turns a token stream into a ROM image plus a
//! symbol table, driving an embedded [`markab_vm::Interpreter`] as its own
//! arithmetic and memory engine the way SPEC_FULL.md's "embedded VM as
//! compile-time evaluator" design note describes. Grounded on the overall
//! shape of `fuel-vm`'s checked-builder pattern (`fuel-tx`'s
//! `TransactionBuilder`): one struct accumulates state across a sequence of
//! calls and is consumed by a final `finish`.

use std::collections::HashMap;
use std::fs;
use std::iter::Peekable;
use std::path::PathBuf;
use std::vec::IntoIter;

use markab_asm::{EntryKind, Opcode};
use markab_vm::{Interpreter, VmConfig};

use crate::dictionary::{payload_offset, Dictionary};
use crate::error::CompileError;
use crate::tokens::{tokenize, Token};

const INIT_SEQ_COUNT: u16 = 4;
const INIT_SEQ_BYTES: u16 = 7;

type TokenStream = Peekable<IntoIter<Token>>;

/// Where the compiler currently is in a `: name ... ;` definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Interpret,
    Compile,
}

struct OpenDefinition {
    name: String,
    body_start: u16,
}

/// Final product of a compile: the ROM bytes and the `address -> name`
/// symbol table. Sorting for display is `crate::rom::render_symbols`'s job.
pub struct CompileOutput {
    pub rom: Vec<u8>,
    pub symbols: Vec<(u16, String)>,
}

pub struct Compiler {
    vm: Interpreter,
    dict: Dictionary,
    dp: u16,
    base: u32,
    mode: Mode,
    last_call: Option<u16>,
    if_patches: Vec<u16>,
    for_starts: Vec<u16>,
    name_set: HashMap<String, (EntryKind, u16)>,
    link_set: HashMap<u16, String>,
    current_def: Option<OpenDefinition>,
    /// Address of the `U16` operand seeding `$irqrx`; patched when a word
    /// named `outer` closes.
    irqrx_init_operand: u16,
    /// Address of the `U16` operand seeding `$irqerr`; patched when a word
    /// named `irqerr` closes.
    irqerr_init_operand: u16,
    /// Address of the dictionary-pointer initializer's operand; patched
    /// once, at [`Compiler::finish`].
    dp_init_operand: u16,
    /// Address of the prologue's `JMP` offset field; patched when a word
    /// named `boot` closes.
    boot_jmp_operand: u16,
    working_dir: PathBuf,
    load_allowlist: Vec<regex::Regex>,
}

impl Compiler {
    /// Build a fresh compiler with the boot prologue already written: four
    /// 7-byte `U16 imm, U16 addr, SH` initializer sequences seeding the
    /// hashmap pointer, dictionary pointer, `$irqrx`, and `$irqerr` cells, a
    /// 64-bucket hash table zeroed out right after them, and a placeholder
    /// `JMP` that the `boot` word patches once defined.
    pub fn new(config: VmConfig) -> Result<Self, CompileError> {
        let working_dir = config.working_dir.clone();
        let load_allowlist = config.load_allowlist.clone();
        let mut vm = Interpreter::new(config);
        let hashmap_base = markab_vm::consts::HASHMAP_BASE_DEFAULT;
        let dict = Dictionary::new(hashmap_base);

        let mut dp: u16 = 0;
        let targets = [
            markab_vm::consts::HASHMAP_PTR_ADDR,
            markab_vm::consts::DP_ADDR,
            markab_vm::consts::IRQRX_ADDR,
            markab_vm::consts::IRQERR_ADDR,
        ];
        let mut operand_addrs = [0u16; 4];
        for (i, target) in targets.into_iter().enumerate() {
            vm.write_u8(dp, Opcode::U16 as u8)?;
            dp += 1;
            operand_addrs[i] = dp;
            vm.write_u16(dp, 0)?;
            dp += 2;
            vm.write_u8(dp, Opcode::U16 as u8)?;
            dp += 1;
            vm.write_u16(dp, target)?;
            dp += 2;
            vm.write_u8(dp, Opcode::Sh as u8)?;
            dp += 1;
        }
        debug_assert_eq!(dp, INIT_SEQ_COUNT * INIT_SEQ_BYTES);

        let [hashmap_operand, dp_operand, irqrx_operand, irqerr_operand] = operand_addrs;
        vm.write_u16(hashmap_operand, hashmap_base)?;

        for bucket in 0..markab_vm::consts::HASH_BINS as u16 {
            vm.write_u16(dp + bucket * 2, 0)?;
        }
        dp += markab_vm::consts::HASHMAP_BYTES;
        debug_assert_eq!(dp, hashmap_base + markab_vm::consts::HASHMAP_BYTES);

        let boot_jmp_operand = dp + 1;
        vm.write_u8(dp, Opcode::Jmp as u8)?;
        dp += 1;
        vm.write_u16(dp, 0)?;
        dp += 2;

        Ok(Self {
            vm,
            dict,
            dp,
            base: markab_vm::consts::DEFAULT_BASE as u32,
            mode: Mode::Interpret,
            last_call: None,
            if_patches: Vec::new(),
            for_starts: Vec::new(),
            name_set: HashMap::new(),
            link_set: HashMap::new(),
            current_def: None,
            irqrx_init_operand: irqrx_operand,
            irqerr_init_operand: irqerr_operand,
            dp_init_operand: dp_operand,
            boot_jmp_operand,
            working_dir,
            load_allowlist,
        })
    }

    /// Compile a whole source string in place, including any `load"
    /// path"` directives it contains.
    pub fn compile_str(&mut self, source: &str) -> Result<(), CompileError> {
        let mut stream = tokenize(source)?.into_iter().peekable();
        while let Some(token) = stream.next() {
            self.handle_token(token, &mut stream)?;
        }
        Ok(())
    }

    fn handle_token(&mut self, token: Token, stream: &mut TokenStream) -> Result<(), CompileError> {
        match token {
            Token::Load(path) => self.load_file(&path),
            Token::Word(word) => self.handle_word(&word, stream),
        }
    }

    fn load_file(&mut self, raw_path: &str) -> Result<(), CompileError> {
        let resolved = crate::fileio::resolve_include(&self.working_dir, &self.load_allowlist, raw_path)?;
        let source = fs::read_to_string(&resolved).map_err(|source| CompileError::Io {
            path: resolved.clone(),
            source,
        })?;
        self.compile_str(&source)
    }

    fn take_name(stream: &mut TokenStream, context: &'static str) -> Result<String, CompileError> {
        match stream.next() {
            Some(Token::Word(name)) => Ok(name),
            _ => Err(CompileError::NotInDefinition(context)),
        }
    }

    fn handle_word(&mut self, word: &str, stream: &mut TokenStream) -> Result<(), CompileError> {
        match word {
            "hex" => {
                self.base = 16;
                Ok(())
            }
            "decimal" => {
                self.base = 10;
                Ok(())
            }
            "var" => {
                let name = Self::take_name(stream, "var")?;
                self.define_var(&name)
            }
            "const" => {
                let name = Self::take_name(stream, "const")?;
                self.define_const(&name)
            }
            "opcode" => {
                let name = Self::take_name(stream, "opcode")?;
                self.define_opcode(&name)
            }
            ":" => {
                let name = Self::take_name(stream, ":")?;
                self.open_definition(name)
            }
            ";" | ";shdw" => self.close_definition(),
            "immediate" => self.mark_immediate(),
            "if{" => self.open_if(),
            "}if" => self.close_if(),
            "for{" => self.open_for(),
            "}for" => self.close_for(),
            "'" => {
                let name = Self::take_name(stream, "'")?;
                self.tick(&name)
            }
            _ => self.compile_or_execute_name(word),
        }
    }

    fn define_var(&mut self, name: &str) -> Result<(), CompileError> {
        let entry_start = self.dict.create(&mut self.vm, &mut self.dp, name)?;
        self.vm.write_u8(self.dp, EntryKind::Var as u8)?;
        self.dp += 1;
        let payload = self.dp;
        self.vm.write_i32(payload, 0)?;
        self.dp += 4;
        self.register_entry(name.to_string(), entry_start, EntryKind::Var);
        Ok(())
    }

    fn define_const(&mut self, name: &str) -> Result<(), CompileError> {
        let value = self.vm.pop()?;
        let entry_start = self.dict.create(&mut self.vm, &mut self.dp, name)?;
        self.vm.write_u8(self.dp, EntryKind::Const as u8)?;
        self.dp += 1;
        self.vm.write_i32(self.dp, value)?;
        self.dp += 4;
        self.register_entry(name.to_string(), entry_start, EntryKind::Const);
        Ok(())
    }

    fn define_opcode(&mut self, name: &str) -> Result<(), CompileError> {
        let value = self.vm.pop()?;
        let entry_start = self.dict.create(&mut self.vm, &mut self.dp, name)?;
        self.vm.write_u8(self.dp, EntryKind::Op as u8)?;
        self.dp += 1;
        self.vm.write_u8(self.dp, value as u8)?;
        self.dp += 1;
        self.vm.write_u8(self.dp, Opcode::Ret as u8)?;
        self.dp += 1;
        self.register_entry(name.to_string(), entry_start, EntryKind::Op);
        Ok(())
    }

    fn open_definition(&mut self, name: String) -> Result<(), CompileError> {
        if self.current_def.is_some() {
            return Err(CompileError::UnclosedConstruct { construct: ":" });
        }
        let entry_start = self.dict.create(&mut self.vm, &mut self.dp, &name)?;
        self.vm.write_u8(self.dp, EntryKind::Obj as u8)?;
        self.dp += 1;
        let body_start = self.dp;
        self.register_entry(name.clone(), entry_start, EntryKind::Obj);
        self.current_def = Some(OpenDefinition { name, body_start });
        self.mode = Mode::Compile;
        self.last_call = None;
        Ok(())
    }

    fn register_entry(&mut self, name: String, entry_start: u16, kind: EntryKind) {
        self.name_set.insert(name.clone(), (kind, entry_start));
        self.link_set.insert(entry_start, name);
    }

    fn mark_immediate(&mut self) -> Result<(), CompileError> {
        let entry_start = match &self.current_def {
            Some(def) => {
                let &(kind, addr) = self
                    .name_set
                    .get(&def.name)
                    .ok_or(CompileError::ImmediateOnNonObj)?;
                if kind != EntryKind::Obj {
                    return Err(CompileError::ImmediateOnNonObj);
                }
                addr
            }
            None => return Err(CompileError::ImmediateOnNonObj),
        };
        self.retag_as_immediate(entry_start)
    }

    fn retag_as_immediate(&mut self, entry_start: u16) -> Result<(), CompileError> {
        let name = self.link_set[&entry_start].clone();
        let type_addr = entry_start + 2 + 1 + name.len() as u16;
        self.vm.write_u8(type_addr, EntryKind::Imm as u8)?;
        self.name_set.insert(name, (EntryKind::Imm, entry_start));
        Ok(())
    }

    fn open_if(&mut self) -> Result<(), CompileError> {
        self.require_compiling("if{")?;
        self.emit_u8(Opcode::Bz as u8)?;
        let placeholder = self.dp;
        self.emit_u8(0)?;
        self.if_patches.push(placeholder);
        self.last_call = None;
        Ok(())
    }

    fn close_if(&mut self) -> Result<(), CompileError> {
        self.require_compiling("}if")?;
        let placeholder = self
            .if_patches
            .pop()
            .ok_or(CompileError::UnclosedConstruct { construct: "if{" })?;
        // `BZ` adds its offset to the address of the offset byte itself
        // (`placeholder`), not to the address following it.
        let distance = self.dp as i32 - placeholder as i32;
        if !(0..=255).contains(&distance) {
            return Err(CompileError::BranchTooFar { distance });
        }
        self.vm.write_u8(placeholder, distance as u8)?;
        self.last_call = None;
        Ok(())
    }

    fn open_for(&mut self) -> Result<(), CompileError> {
        self.require_compiling("for{")?;
        self.emit_u8(Opcode::Mtr as u8)?;
        self.for_starts.push(self.dp);
        self.last_call = None;
        Ok(())
    }

    fn close_for(&mut self) -> Result<(), CompileError> {
        self.require_compiling("}for")?;
        let loop_start = self
            .for_starts
            .pop()
            .ok_or(CompileError::UnclosedConstruct { construct: "for{" })?;
        self.emit_u8(Opcode::Bfor as u8)?;
        // `BFOR` subtracts its offset from the address of the offset byte
        // itself (`self.dp`, about to be written), not from the address
        // following it.
        let offset_addr = self.dp as i32;
        let distance = offset_addr - loop_start as i32;
        if !(0..=255).contains(&distance) {
            return Err(CompileError::BranchTooFar { distance });
        }
        self.emit_u8(distance as u8)?;
        self.last_call = None;
        Ok(())
    }

    fn require_compiling(&self, construct: &'static str) -> Result<(), CompileError> {
        if self.mode != Mode::Compile || self.current_def.is_none() {
            return Err(CompileError::NotInDefinition(construct));
        }
        Ok(())
    }

    /// `'` looks a name up and pushes or compiles its payload address —
    /// the same dual interpret/compile behavior any other reference gets,
    /// just always the address rather than a kind-specific encoding.
    fn tick(&mut self, name: &str) -> Result<(), CompileError> {
        let &(_, entry_start) = self
            .name_set
            .get(name)
            .ok_or_else(|| markab_vm::error::Fault::UnknownWord { word: name.to_string() })?;
        let payload = entry_start + payload_offset(self.link_set[&entry_start].len() as u8);
        self.push_or_compile_literal(payload as i32)
    }

    fn compile_or_execute_name(&mut self, word: &str) -> Result<(), CompileError> {
        if let Some(&(kind, entry_start)) = self.name_set.get(word) {
            return self.emit_reference(kind, entry_start);
        }
        match i32::from_str_radix(word, self.base) {
            Ok(value) => self.push_or_compile_literal(value),
            Err(_) => Err(markab_vm::error::Fault::UnknownWord { word: word.to_string() }.into()),
        }
    }

    fn emit_reference(&mut self, kind: EntryKind, entry_start: u16) -> Result<(), CompileError> {
        let name = self.link_set[&entry_start].clone();
        let payload = entry_start + payload_offset(name.len() as u8);
        match kind {
            EntryKind::Var => self.push_or_compile_literal(payload as i32),
            EntryKind::Const => {
                let value = self.vm.read_i32(payload)?;
                self.push_or_compile_literal(value)
            }
            EntryKind::Op => {
                let opcode_byte = self.vm.read_u8(payload)?;
                self.emit_u8(opcode_byte)?;
                self.last_call = None;
                Ok(())
            }
            // A colon-defined word is compiled as a call in either mode:
            // the embedded evaluator's own stack is only the target for
            // bare number literals, not for invoking other definitions.
            EntryKind::Obj | EntryKind::Imm => {
                let call_site = self.dp;
                self.emit_u8(Opcode::Jal as u8)?;
                let after_operand = self.dp + 2;
                let offset = payload.wrapping_sub(after_operand) as i16;
                self.emit_u16(offset as u16)?;
                self.last_call = Some(call_site);
                Ok(())
            }
        }
    }

    fn push_or_compile_literal(&mut self, value: i32) -> Result<(), CompileError> {
        if self.mode == Mode::Interpret {
            self.vm.push(value)?;
            return Ok(());
        }
        if (0..=255).contains(&value) {
            self.emit_u8(Opcode::U8 as u8)?;
            self.emit_u8(value as u8)?;
        } else if (0..=65535).contains(&value) {
            self.emit_u8(Opcode::U16 as u8)?;
            self.emit_u16(value as u16)?;
        } else {
            self.emit_u8(Opcode::I32 as u8)?;
            self.emit_i32(value)?;
        }
        self.last_call = None;
        Ok(())
    }

    fn emit_u8(&mut self, byte: u8) -> Result<(), markab_vm::error::Fault> {
        self.vm.write_u8(self.dp, byte)?;
        self.dp = self.dp.wrapping_add(1);
        Ok(())
    }

    fn emit_u16(&mut self, value: u16) -> Result<(), markab_vm::error::Fault> {
        self.vm.write_u16(self.dp, value)?;
        self.dp = self.dp.wrapping_add(2);
        Ok(())
    }

    fn emit_i32(&mut self, value: i32) -> Result<(), markab_vm::error::Fault> {
        self.vm.write_i32(self.dp, value)?;
        self.dp = self.dp.wrapping_add(4);
        Ok(())
    }

    /// Close a definition, folding a dangling tail call into a plain jump:
    /// if the very last bytes emitted in the body are the `JAL` that
    /// `emit_reference` just compiled, rewrite its opcode byte to `JMP`
    /// instead of appending a trailing `RET` — the callee returns straight
    /// to the caller's caller, so the return stack never grows for it.
    fn close_definition(&mut self) -> Result<(), CompileError> {
        let def = self.current_def.take().ok_or(CompileError::NotInDefinition(";"))?;
        if !self.if_patches.is_empty() {
            return Err(CompileError::UnclosedConstruct { construct: "if{" });
        }
        if !self.for_starts.is_empty() {
            return Err(CompileError::UnclosedConstruct { construct: "for{" });
        }

        match self.last_call.filter(|&addr| addr + 3 == self.dp) {
            Some(addr) => {
                self.vm.write_u8(addr, Opcode::Jmp as u8)?;
            }
            None => self.emit_u8(Opcode::Ret as u8)?,
        }
        self.last_call = None;
        self.mode = Mode::Interpret;

        match def.name.as_str() {
            "boot" => {
                let after_operand = self.boot_jmp_operand + 2;
                let offset = def.body_start.wrapping_sub(after_operand) as i16;
                self.vm.write_u16(self.boot_jmp_operand, offset as u16)?;
            }
            "outer" => {
                self.vm.write_u16(self.irqrx_init_operand, def.body_start)?;
            }
            "irqerr" => {
                self.vm.write_u16(self.irqerr_init_operand, def.body_start)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Write the final ROM image: patch the dictionary-pointer initializer
    /// with the finished `DP`, then copy out bytes `0..DP`.
    pub fn finish(mut self) -> Result<CompileOutput, CompileError> {
        if self.current_def.is_some() {
            return Err(CompileError::NotInDefinition(
                "end of input reached with a definition still open",
            ));
        }
        self.vm.write_u16(self.dp_init_operand, self.dp)?;
        let rom = crate::rom::extract_image(&self.vm, self.dp);
        let symbols = self.link_set.into_iter().collect();
        Ok(CompileOutput { rom, symbols })
    }
}
