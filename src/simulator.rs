//! Holds a loaded program and data image and drives a [`Model`] to termination (§4.6).

use crate::instruction::Instruction;
use crate::model::Model;
use crate::variant::Variant;

/// A program counter value is always `address >> 2` into this vector.
#[derive(Debug, Clone)]
pub struct Simulator {
    model: Model,
    program: Vec<Instruction>,
}

impl Simulator {
    pub fn new(variant: Variant) -> Self {
        Self { model: Model::new(variant), program: Vec::new() }
    }

    /// Stores `program` in little-endian word order starting at `address >> 2`. Only address
    /// 0 is exercised by the test suite, per §4.6.
    pub fn load_program(&mut self, program: impl IntoIterator<Item = Instruction>, address: u64) {
        let base = (address >> 2) as usize;
        for (offset, insn) in program.into_iter().enumerate() {
            let index = base + offset;
            if index >= self.program.len() {
                self.program.resize(index + 1, Instruction::Fence);
            }
            self.program[index] = insn;
        }
    }

    /// Writes little-endian 32-bit groups into memory starting at `address >> 2`. Trailing
    /// bytes that don't fill a whole word are dropped (§4.6 allows rounding down).
    pub fn load_data(&mut self, data: &[u8], address: u64) {
        let base = address >> 2;
        for (i, chunk) in data.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            self.model.state.memory_mut().preload_word(base + i as u64, word);
        }
    }

    /// Resets state, then fetches and issues `program[pc>>2]` in a loop, stopping on
    /// termination (`ecall` with return code 0) or when the PC runs off the end of the
    /// program (§4.6).
    pub fn run(&mut self, pc: u64) -> u64 {
        self.model.reset(pc);
        let mut count = 0u64;
        loop {
            let index = (self.model.state.pc().unsigned() >> 2) as usize;
            let Some(insn) = self.program.get(index).copied() else {
                return count;
            };
            match self.model.issue(&insn) {
                Ok(_) => count += 1,
                Err(terminate) => {
                    assert_eq!(terminate.returncode, 0, "program terminated with nonzero return code");
                    return count;
                }
            }
        }
    }

    /// Serializes materialized memory words in ascending address order as little-endian
    /// bytes, filtered to `[address, address + size)` (or unbounded if `size` is `None`).
    pub fn dump_data(&self, address: u64, size: Option<u64>) -> Vec<u8> {
        let mut words: Vec<(u64, u32)> = self.model.state.memory().words().collect();
        words.sort_by_key(|&(addr, _)| addr);
        let mut out = Vec::new();
        for (addr, word) in words {
            if addr < address {
                continue;
            }
            if let Some(size) = size {
                if addr >= address + size {
                    continue;
                }
            }
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::IFormat;
    use crate::immediate::Immediate;
    use crate::regindex::{X0, X10};

    #[test]
    fn run_counts_instructions_until_ecall() {
        let mut sim = Simulator::new(Variant::parse("RV32I").unwrap());
        let mut zero = Immediate::new(12, true, false);
        zero.set(0).unwrap();
        let nop = Instruction::Addi(IFormat { rd: X0, rs1: X0, imm: zero });
        let set_a0 = Instruction::Addi(IFormat { rd: X10, rs1: X0, imm: zero });
        sim.load_program([nop, set_a0, Instruction::Ecall], 0);
        let count = sim.run(0);
        assert_eq!(count, 2, "ecall itself does not count as a committed issue");
    }

    #[test]
    fn run_stops_at_program_end_without_ecall() {
        let mut sim = Simulator::new(Variant::parse("RV32I").unwrap());
        let mut zero = Immediate::new(12, true, false);
        zero.set(0).unwrap();
        let nop = Instruction::Addi(IFormat { rd: X0, rs1: X0, imm: zero });
        sim.load_program([nop], 0);
        assert_eq!(sim.run(0), 1);
    }

    #[test]
    fn load_data_and_dump_data_round_trip() {
        let mut sim = Simulator::new(Variant::parse("RV32I").unwrap());
        sim.load_data(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08], 0);
        assert_eq!(sim.dump_data(0, None), vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(sim.dump_data(4, None), vec![0x05, 0x06, 0x07, 0x08]);
    }
}
