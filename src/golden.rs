//! Reference execution mirrored against an external retire stream (§4.7, §2 component 10).

use std::collections::VecDeque;
use std::fmt;

use crate::error::{GoldenError, GoldenProgramEnd};
use crate::instruction::Instruction;
use crate::model::Model;
use crate::registers::Register;
use crate::state::Trace;
use crate::variant::Variant;

/// Either a hard mismatch or the soft "ran off the end of the program" signal (§4.7); kept
/// separate from [`GoldenError`] for the same reason [`crate::error::Terminate`] is kept out
/// of [`crate::error::RiscvError`] — end-of-program is control flow, not a fault.
#[derive(Debug)]
pub enum GoldenFault {
    Mismatch(GoldenError),
    End(GoldenProgramEnd),
}

impl fmt::Display for GoldenFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoldenFault::Mismatch(e) => write!(f, "{e}"),
            GoldenFault::End(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for GoldenFault {}

impl From<GoldenError> for GoldenFault {
    fn from(e: GoldenError) -> Self {
        GoldenFault::Mismatch(e)
    }
}
impl From<GoldenProgramEnd> for GoldenFault {
    fn from(e: GoldenProgramEnd) -> Self {
        GoldenFault::End(e)
    }
}

/// An RVFI-style retire record (§4.7): `insn` is the raw machine word, `rd_addr`/`rd_wdata`
/// the committed register write (if any).
#[derive(Debug, Clone, Copy)]
pub struct RvfiSignals {
    pub valid: bool,
    pub insn: u32,
    pub rd_addr: u32,
    pub rd_wdata: u64,
}

/// Translates one RVFI retire record into the `TraceIntegerRegister` entries
/// [`Model::check`] expects (§4.7). A write to `rd == 0` with nonzero data is an invariant
/// violation rather than a silently-dropped write, since the hardware guarantees `x0` never
/// actually changes.
pub fn traces_from_rvfi(signals: &RvfiSignals) -> Result<Vec<Trace>, GoldenError> {
    if !signals.valid {
        return Ok(Vec::new());
    }
    if signals.rd_addr == 0 && signals.rd_wdata != 0 {
        return Err(GoldenError::ZeroRegisterWritten(signals.rd_wdata));
    }
    if signals.rd_addr == 0 {
        return Ok(Vec::new());
    }
    let value = Register::from_bits(32, u128::from(signals.rd_wdata));
    Ok(vec![Trace::IntReg(crate::registers::TraceIntegerRegister { index: signals.rd_addr as usize, value })])
}

/// Unbuffered golden model: a `Model` stepped in lockstep with an externally driven
/// fetch/commit protocol (§4.7).
#[derive(Debug)]
pub struct GoldenUnbuffered {
    model: Model,
    program: Vec<Instruction>,
    pc: u64,
    issued: VecDeque<Instruction>,
}

impl GoldenUnbuffered {
    pub fn new(variant: Variant, program: Vec<Instruction>, pc: u64) -> Self {
        let mut model = Model::new(variant);
        model.reset(pc);
        Self { model, program, pc, issued: VecDeque::new() }
    }

    /// Resets the model and in-flight queue, as if a new program run were starting.
    pub fn reset(&mut self, pc: u64) {
        self.model.reset(pc);
        self.pc = pc;
        self.issued.clear();
    }

    /// Returns `program[requested_pc >> 2]` if it matches the model's internal PC, advancing
    /// it and queuing the instruction as "in flight" until the matching [`GoldenUnbuffered::commit`].
    /// Fails `GoldenFault::Mismatch` on an unexpected PC, signals `GoldenFault::End` once the
    /// index runs past the end of the program.
    pub fn fetch(&mut self, requested_pc: u64) -> Result<Instruction, GoldenFault> {
        if requested_pc != self.pc {
            return Err(GoldenError::UnexpectedFetchPc { expected: self.pc, got: requested_pc }.into());
        }
        let index = (self.pc >> 2) as usize;
        let insn = *self.program.get(index).ok_or(GoldenProgramEnd)?;
        self.issued.push_back(insn);
        self.pc += 4;
        Ok(insn)
    }

    /// Pops the oldest fetched instruction, optionally checks it against `insn`, executes it
    /// on the model, and asserts the observed `trace` matches the model's own trace (§4.7). An
    /// empty in-flight queue always signals `GoldenFault::End`, mirroring `golden.py`'s
    /// `GoldenProgramEndException` (raised unconditionally there, regardless of `insn`).
    pub fn commit(&mut self, trace: &[Trace], insn: Option<&Instruction>) -> Result<(), GoldenFault> {
        let expected = self.issued.pop_front().ok_or(GoldenProgramEnd)?;

        if let Some(insn) = insn {
            if *insn != expected {
                return Err(GoldenError::UnexpectedInstruction {
                    expected: expected.mnemonic().to_string(),
                    got: insn.mnemonic().to_string(),
                }
                .into());
            }
        }

        let expected_trace = self
            .model
            .issue(&expected)
            .expect("golden reference programs must not ecall mid-trace-comparison");

        if !self.model.check(trace) {
            return Err(GoldenError::StateMismatch {
                observed: format!("{trace:?}"),
                expected: format!("{expected_trace:?}"),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::IFormat;
    use crate::immediate::Immediate;
    use crate::regindex::X0;

    fn addi(rd: crate::regindex::RegIndex, value: i64) -> Instruction {
        let mut imm = Immediate::new(12, true, false);
        imm.set(value).unwrap();
        Instruction::Addi(IFormat { rd, rs1: X0, imm })
    }

    #[test]
    fn fetch_rejects_unexpected_pc() {
        let mut golden = GoldenUnbuffered::new(Variant::parse("RV32I").unwrap(), vec![addi(crate::regindex::X1, 5)], 0);
        assert!(matches!(
            golden.fetch(4),
            Err(GoldenFault::Mismatch(GoldenError::UnexpectedFetchPc { expected: 0, got: 4 }))
        ));
    }

    #[test]
    fn fetch_past_program_end_signals_end() {
        let mut golden = GoldenUnbuffered::new(Variant::parse("RV32I").unwrap(), vec![], 0);
        assert!(matches!(golden.fetch(0), Err(GoldenFault::End(_))));
    }

    #[test]
    fn fetch_then_commit_matches_model() {
        let mut golden = GoldenUnbuffered::new(Variant::parse("RV32I").unwrap(), vec![addi(crate::regindex::X1, 5)], 0);
        let insn = golden.fetch(0).unwrap();
        let observed = vec![Trace::IntReg(crate::registers::TraceIntegerRegister {
            index: 1,
            value: Register::from_signed(32, 5),
        })];
        assert!(golden.commit(&observed, Some(&insn)).is_ok());
    }

    #[test]
    fn commit_rejects_mismatched_trace() {
        let mut golden = GoldenUnbuffered::new(Variant::parse("RV32I").unwrap(), vec![addi(crate::regindex::X1, 5)], 0);
        let insn = golden.fetch(0).unwrap();
        let wrong = vec![Trace::IntReg(crate::registers::TraceIntegerRegister {
            index: 1,
            value: Register::from_signed(32, 999),
        })];
        assert!(matches!(golden.commit(&wrong, Some(&insn)), Err(GoldenFault::Mismatch(_))));
    }

    #[test]
    fn commit_with_empty_queue_signals_end() {
        let mut golden = GoldenUnbuffered::new(Variant::parse("RV32I").unwrap(), vec![], 0);
        assert!(matches!(golden.commit(&[], None), Err(GoldenFault::End(_))));
    }

    #[test]
    fn rvfi_rejects_zero_register_write() {
        let signals = RvfiSignals { valid: true, insn: 0, rd_addr: 0, rd_wdata: 5 };
        assert!(matches!(traces_from_rvfi(&signals), Err(GoldenError::ZeroRegisterWritten(5))));
    }

    #[test]
    fn rvfi_translates_rd_write() {
        let signals = RvfiSignals { valid: true, insn: 0, rd_addr: 3, rd_wdata: 42 };
        let traces = traces_from_rvfi(&signals).unwrap();
        assert_eq!(traces.len(), 1);
    }
}
