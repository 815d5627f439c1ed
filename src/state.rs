//! Architectural simulation state: register file, program counter, memory and the atomic
//! reservation flag (§3 `State`, §5 reservation model).

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::memory::{Memory, TraceMemory};
use crate::registers::{Register, RegisterFile, TraceIntegerRegister};
use crate::variant::Variant;

/// One entry of the structured record a commit produces (§3 `Trace`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    IntReg(TraceIntegerRegister),
    Pc(u128),
    Mem(TraceMemory),
}

/// The full architectural state a [`crate::model::Model`] steps (§3 `State`).
///
/// `pc` is only ever changed through [`State::set_pc`] — the explicit replacement (§9 DESIGN
/// NOTES) for the source's `pc=` attribute interception, which routed assignments into a
/// shadow `pc_update`/`pc_next` field by comparing the assigned key's identity to the string
/// `"pc"`.
#[derive(Debug, Clone)]
pub struct State {
    pub variant: Variant,
    pub regfile: RegisterFile,
    pc: Register,
    pc_next: Register,
    memory: Memory,
    reservation: Option<u64>,
    rng: StdRng,
}

impl State {
    /// A fresh state for `variant`, registers and PC zeroed, memory zero-filled on read.
    pub fn new(variant: Variant) -> Self {
        let width = variant.xlen();
        let regfile = RegisterFile::new(variant.intregs(), width);
        Self {
            variant,
            regfile,
            pc: Register::zero(width),
            pc_next: Register::zero(width),
            memory: Memory::new(),
            reservation: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// A state whose memory fills unseen words from a seeded PRNG rather than zero, and whose
    /// register file can be [`State::randomize`]d from the same stream.
    pub fn randomized(variant: Variant, seed: u64) -> Self {
        let width = variant.xlen();
        let regfile = RegisterFile::new(variant.intregs(), width);
        Self {
            variant,
            regfile,
            pc: Register::zero(width),
            pc_next: Register::zero(width),
            memory: Memory::randomized(),
            reservation: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn xlen(&self) -> u32 {
        self.variant.xlen()
    }

    pub fn pc(&self) -> Register {
        self.pc
    }

    /// Stages a new `pc_next`; execute functions that diverge from the linear `pc + 4` advance
    /// call this instead of assigning `pc` directly (§4.5, §9 DESIGN NOTES).
    pub fn set_pc(&mut self, value: Register) {
        self.pc_next = value;
    }

    /// Speculatively advances `pc_next` to `pc + 4` before dispatching `execute` (§4.5 step 1).
    pub(crate) fn advance_pc(&mut self) {
        self.pc_next = self.pc + Register::from_signed(self.xlen(), 4);
    }

    /// Resets `pc`/`pc_next` to `pc` and clears the atomic reservation; register/memory content
    /// is left untouched (matching `model.py`'s `State.reset`, which only ever reset `pc`).
    pub fn reset(&mut self, pc: u64) {
        self.pc = Register::from_bits(self.xlen(), pc as u128);
        self.pc_next = self.pc;
        self.reservation = None;
    }

    /// Reseeds every non-wired register with a uniformly random width-bit value.
    pub fn randomize(&mut self) {
        let mut rng = self.rng.clone();
        self.regfile.randomize(&mut rng);
        self.rng = rng;
    }

    /// Marks `addr` as reserved for a subsequent `sc` (the `aq` side of `lr`).
    pub fn atomic_acquire(&mut self, addr: u64) {
        self.reservation = Some(addr);
    }

    /// Clears the reservation on `addr`, if it is the one currently held.
    pub fn atomic_release(&mut self, addr: u64) {
        if self.reservation == Some(addr) {
            self.reservation = None;
        }
    }

    /// True iff `addr` currently holds a live reservation.
    pub fn atomic_reserved(&self, addr: u64) -> bool {
        self.reservation == Some(addr)
    }

    pub fn lb(&mut self, addr: u64) -> u8 {
        self.memory.lb(addr, &mut self.rng)
    }

    pub fn lh(&mut self, addr: u64) -> u16 {
        self.memory.lh(addr, &mut self.rng)
    }

    pub fn lw(&mut self, addr: u64) -> u32 {
        self.memory.lw(addr, &mut self.rng)
    }

    /// Loads a 64-bit doubleword as two adjacent little-endian words; RV64's `ld` is the only
    /// caller (§11 SUPPLEMENTAL FEATURES — Memory itself only models byte/half/word granules).
    pub fn ld(&mut self, addr: u64) -> u64 {
        let lo = u64::from(self.lw(addr));
        let hi = u64::from(self.lw(addr + 4));
        lo | (hi << 32)
    }

    pub fn sb(&mut self, addr: u64, data: u8) {
        self.memory.sb(addr, data);
    }

    pub fn sh(&mut self, addr: u64, data: u16) {
        self.memory.sh(addr, data);
    }

    pub fn sw(&mut self, addr: u64, data: u32) {
        self.memory.sw(addr, data);
    }

    pub fn sd(&mut self, addr: u64, data: u64) {
        self.memory.sw(addr, data as u32);
        self.memory.sw(addr + 4, (data >> 32) as u32);
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Integer-register, PC, and memory deltas pending since the last commit (§3 `Trace`,
    /// §4.5 step 3 — a `Pc` entry appears iff `pc_next != pc + 4`).
    pub fn changes(&self) -> Vec<Trace> {
        let mut out: Vec<Trace> = self.regfile.changes().into_iter().map(Trace::IntReg).collect();
        let linear = self.pc + Register::from_signed(self.xlen(), 4);
        if self.pc_next != linear {
            out.push(Trace::Pc(self.pc_next.unsigned()));
        }
        out.extend(self.memory.changes().iter().copied().map(Trace::Mem));
        out
    }

    /// Applies every pending register and memory write and advances `pc` to `pc_next`
    /// (§4.5 step 4).
    pub fn commit(&mut self) {
        self.regfile.commit();
        self.pc = self.pc_next;
        let mut rng = self.rng.clone();
        self.memory.commit(&mut rng);
        self.rng = rng;
    }
}
