//! `Model`: fetch → execute (on pending state) → trace → commit, plus the equivalence check
//! the golden bridge relies on (§2 component 8, §4.5 Commit/Trace Protocol).

use crate::error::Terminate;
use crate::instruction::Instruction;
use crate::state::{State, Trace};
use crate::variant::Variant;

/// Drives one [`State`] instruction-by-instruction.
#[derive(Debug, Clone)]
pub struct Model {
    pub state: State,
    verbose: bool,
}

impl Model {
    pub fn new(variant: Variant) -> Self {
        Self { state: State::new(variant), verbose: false }
    }

    /// Enables a `tracing::trace!` event per issued instruction (§10.2).
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Issues one instruction: stage the linear PC advance, execute, collect the trace, then
    /// commit. Returns `Err(Terminate)` (without committing) when `insn` is `ecall`.
    pub fn issue(&mut self, insn: &Instruction) -> Result<Vec<Trace>, Terminate> {
        self.state.advance_pc();
        insn.execute(&mut self.state)?;
        let trace = self.state.changes();
        if self.verbose {
            tracing::trace!(mnemonic = insn.mnemonic(), changes = trace.len(), "issued");
        }
        self.state.commit();
        Ok(trace)
    }

    /// True iff every `IntReg` entry in `trace` matches the current committed register file.
    /// PC and memory entries are surfaced in the trace but not checked here (§4.5).
    pub fn check(&self, trace: &[Trace]) -> bool {
        trace.iter().all(|entry| match entry {
            Trace::IntReg(r) => self.state.regfile.read(r.index) == r.value,
            Trace::Pc(_) | Trace::Mem(_) => true,
        })
    }

    pub fn randomize(&mut self) {
        self.state.randomize();
    }

    pub fn reset(&mut self, pc: u64) {
        self.state.reset(pc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::IFormat;
    use crate::immediate::Immediate;
    use crate::regindex::{X0, X1};

    #[test]
    fn issue_commits_and_returns_trace() {
        let mut model = Model::new(Variant::parse("RV32I").unwrap());
        let mut imm = Immediate::new(12, true, false);
        imm.set(9).unwrap();
        let insn = Instruction::Addi(IFormat { rd: X1, rs1: X0, imm });
        let trace = model.issue(&insn).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(model.state.regfile.read(1).signed(), 9);
    }

    #[test]
    fn check_accepts_matching_trace_and_rejects_stale_one() {
        let mut model = Model::new(Variant::parse("RV32I").unwrap());
        let mut imm = Immediate::new(12, true, false);
        imm.set(9).unwrap();
        let insn = Instruction::Addi(IFormat { rd: X1, rs1: X0, imm });
        let trace = model.issue(&insn).unwrap();
        assert!(model.check(&trace));

        let mut stale = trace;
        if let crate::state::Trace::IntReg(r) = &mut stale[0] {
            r.value = crate::registers::Register::from_signed(32, 123);
        }
        assert!(!model.check(&stale));
    }

    #[test]
    fn ecall_does_not_commit() {
        let mut model = Model::new(Variant::parse("RV32I").unwrap());
        model.state.regfile.write(10, crate::registers::Register::from_signed(32, 0));
        model.state.commit();
        let pc_before = model.state.pc();
        let err = model.issue(&Instruction::Ecall).unwrap_err();
        assert_eq!(err.returncode, 0);
        assert_eq!(model.state.pc(), pc_before, "a terminating instruction must not advance pc");
    }
}
