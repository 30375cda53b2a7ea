//! The interpreter: owns memory, both stacks, the register file, and the
//! host-facing input/output queues. Grounded on the field layout and
//! constructor shape of `fuel-vm`'s `Interpreter` in
//! `fuel-vm/src/interpreter.rs` / `fuel-vm/src/interpreter/constructors.rs`.

mod alu;
mod boot;
mod control;
mod dispatch;
mod fileio;
mod io;

use std::collections::VecDeque;

use crate::config::VmConfig;
use crate::consts::{HEAP_MAX, IRQERR_ADDR, IRQRX_ADDR};
use crate::error::{Fault, HostError};
use crate::memory::Ram;
use crate::registers::Registers;
use crate::stack::{DataStack, ReturnStack};
use crate::state::{ExecuteState, ProgramState};

/// A single Markab machine: memory, stacks, registers, and the queues a host
/// uses to feed it input and drain its output. Not `Clone` — a running
/// machine owns open trace/log state a clone would have to fork awkwardly,
/// and nothing in the design needs to snapshot one.
pub struct Interpreter {
    ram: Ram,
    data: DataStack,
    ret: ReturnStack,
    regs: Registers,
    config: VmConfig,
    /// Bytes received but not yet consumed by `IOKEY`.
    input: VecDeque<u8>,
    /// Bytes emitted by `IOEMIT` but not yet flushed to the host.
    output: Vec<u8>,
    cycles_run: u32,
}

impl Interpreter {
    /// Build a fresh, unbooted machine: zeroed memory, empty stacks, default
    /// registers.
    pub fn new(config: VmConfig) -> Self {
        let trace = config.trace;
        let mut regs = Registers::new();
        regs.trace = trace;
        Self {
            ram: Ram::new(),
            data: DataStack::new(),
            ret: ReturnStack::new(),
            regs,
            config,
            input: VecDeque::new(),
            output: Vec::new(),
            cycles_run: 0,
        }
    }

    /// Load a ROM image at the heap base and run it once to completion (or
    /// until it halts or raises an unhandled fault). This executes the
    /// image's boot prologue and anything `JAL`ed from it before control
    /// first returns to the host.
    #[tracing::instrument(skip(self, image), fields(image_len = image.len()))]
    pub fn boot(&mut self, image: &[u8]) -> Result<ProgramState, HostError> {
        boot::boot(self, image)
    }

    /// Feed received bytes to the machine and invoke its receive-line
    /// interrupt vector once. Bytes are queued for `IOKEY`; the host should
    /// call this once per line (or once per available chunk) the way a
    /// terminal driver feeds a serial port.
    #[tracing::instrument(skip(self, line))]
    pub fn receive_line(&mut self, line: &[u8]) -> Result<ProgramState, HostError> {
        boot::receive_line(self, line)
    }

    /// Run from the current `$pc` until the step loop halts, returns from
    /// its outermost call, or exhausts the cycle budget. Faults are vectored
    /// to `$irqerr` if one is installed; otherwise they escape as
    /// [`HostError::UnhandledFault`].
    pub fn run(&mut self) -> Result<ProgramState, HostError> {
        boot::run_with_error_vector(self)
    }

    /// Execute a single instruction at the current `$pc`.
    pub fn step(&mut self) -> Result<ExecuteState, Fault> {
        dispatch::step(self)
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn data_stack(&self) -> &DataStack {
        &self.data
    }

    pub fn return_stack(&self) -> &ReturnStack {
        &self.ret
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn halted(&self) -> bool {
        self.regs.halted
    }

    /// Drain and return any output bytes emitted since the last drain.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    // --- Compile-time evaluator surface -----------------------------
    //
    // `markab-compiler` drives an `Interpreter` as its own arithmetic and
    // memory engine rather than duplicating these primitives (see
    // SPEC_FULL.md's "Embedded VM as compile-time evaluator" design note):
    // the compiler's constant-folding literals live on this data stack, and
    // every byte it emits is written through these same bound-checked
    // paths `SB`/`SH`/`SW` use at runtime.

    /// Push a value onto the data stack, the same as the `U8`/`U16`/`I32`
    /// opcodes do at runtime.
    pub fn push(&mut self, value: i32) -> Result<(), Fault> {
        self.push_data(value)
    }

    /// Push onto the data stack. Overflow resets *both* stacks; the data
    /// stack already clears itself, this clears the return stack to match.
    /// Underflow elsewhere is never reset.
    pub(super) fn push_data(&mut self, value: i32) -> Result<(), Fault> {
        let result = self.data.push(value);
        if result.is_err() {
            self.ret.clear();
        }
        result
    }

    /// Push onto the return stack. Overflow resets both stacks, mirroring
    /// [`Interpreter::push_data`].
    pub(super) fn push_return(&mut self, value: i32) -> Result<(), Fault> {
        let result = self.ret.push(value);
        if result.is_err() {
            self.data.clear();
        }
        result
    }

    /// Pop the data stack, the same as `DROP` consuming `$t`.
    pub fn pop(&mut self) -> Result<i32, Fault> {
        self.data.pop()
    }

    pub fn write_u8(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        self.ram.store_u8(addr, value)
    }

    pub fn write_u16(&mut self, addr: u16, value: u16) -> Result<(), Fault> {
        self.ram.store_u16(addr, value)
    }

    pub fn write_i32(&mut self, addr: u16, value: i32) -> Result<(), Fault> {
        self.ram.store_i32(addr, value)
    }

    pub fn read_u8(&self, addr: u16) -> Result<u8, Fault> {
        self.ram.load_u8(addr)
    }

    pub fn read_u16(&self, addr: u16) -> Result<u16, Fault> {
        self.ram.load_u16(addr)
    }

    pub fn read_i32(&self, addr: u16) -> Result<i32, Fault> {
        self.ram.load_i32(addr)
    }

    fn irqrx(&self) -> Result<u16, Fault> {
        self.ram.load_u16(IRQRX_ADDR)
    }

    fn irqerr(&self) -> Result<u16, Fault> {
        self.ram.load_u16(IRQERR_ADDR)
    }

    fn fetch_pc_checked(&self) -> Result<(), Fault> {
        if self.regs.pc > HEAP_MAX {
            return Err(Fault::BadPcAddr { pc: self.regs.pc });
        }
        Ok(())
    }

    /// Mutable RAM access, for submodules that implement individual
    /// opcodes. Not exposed outside the crate.
    fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    fn fetch_u8(&mut self) -> Result<u8, Fault> {
        self.fetch_pc_checked()?;
        let byte = self.ram.load_u8(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(byte)
    }

    fn fetch_u16(&mut self) -> Result<u16, Fault> {
        self.fetch_pc_checked()?;
        let value = self.ram.load_u16(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(2);
        Ok(value)
    }

    fn fetch_i32(&mut self) -> Result<i32, Fault> {
        self.fetch_pc_checked()?;
        let value = self.ram.load_i32(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(4);
        Ok(value)
    }
}
