//! The ten 32-bit/16-bit instruction layouts (§4.4). Each format exposes `decode`/`encode`
//! for its dynamic operand slots; static opcode/funct bits are owned by the per-mnemonic
//! definitions in [`crate::isa`], which call into these.

use crate::bits::{extract, sign_extend};
use crate::field::Field;
use crate::immediate::Immediate;
use crate::regindex::RegIndex;

fn reg(word: u32, range: std::ops::Range<u32>) -> RegIndex {
    RegIndex::try_from(extract(word, range)).expect("5-bit field always fits a register index")
}

/// `R`: two source registers, one destination, no immediate. `add`, `sub`, `sll`, …
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RFormat {
    pub rd: RegIndex,
    pub rs1: RegIndex,
    pub rs2: RegIndex,
}

impl RFormat {
    pub(crate) fn decode(word: u32) -> Self {
        Self { rd: reg(word, 7..12), rs1: reg(word, 15..20), rs2: reg(word, 20..25) }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        word | self.rd.into_u32() << 7 | self.rs1.into_u32() << 15 | self.rs2.into_u32() << 20
    }
}

/// `I`/`IL`: one source register, 12-bit signed immediate. Arithmetic-immediate, `jalr`,
/// loads, `ecall`/`csr*` all share this shape (`IL` is the same bits with load-syntax
/// disassembly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IFormat {
    pub rd: RegIndex,
    pub rs1: RegIndex,
    pub imm: Immediate,
}

impl IFormat {
    pub(crate) fn decode(word: u32) -> Self {
        let mut imm = Immediate::new(12, true, false);
        imm.set_from_bits(u64::from(extract(word, 20..32))).expect("12-bit field always in range");
        Self { rd: reg(word, 7..12), rs1: reg(word, 15..20), imm }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        word | self.rd.into_u32() << 7 | self.rs1.into_u32() << 15 | (self.imm.unsigned() as u32) << 20
    }
}

/// `IS`: shift-by-immediate. `width` is 5 for RV32 shifts, 6 for the RV64 full-width forms
/// (`slli`/`srli`/`srai` on a 64-bit core use all of bits [20:26)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ShiftFormat {
    pub rd: RegIndex,
    pub rs1: RegIndex,
    pub shamt: u32,
}

impl ShiftFormat {
    pub(crate) fn decode(word: u32, width: u32) -> Self {
        Self { rd: reg(word, 7..12), rs1: reg(word, 15..20), shamt: extract(word, 20..20 + width) }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        word | self.rd.into_u32() << 7 | self.rs1.into_u32() << 15 | (self.shamt << 20)
    }
}

/// `S`: two source registers, 12-bit signed immediate split across `[7:12)`/`[25:32)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SFormat {
    pub rs1: RegIndex,
    pub rs2: RegIndex,
    pub imm: Immediate,
}

impl SFormat {
    fn field() -> Field {
        Field::new(vec![(7..12, 0..5), (25..32, 5..12)], 0)
    }

    pub(crate) fn decode(word: u32) -> Self {
        let mut imm = Immediate::new(12, true, false);
        imm.set_from_bits(u64::from(Self::field().extract(word))).expect("12-bit field always in range");
        Self { rs1: reg(word, 15..20), rs2: reg(word, 20..25), imm }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        let word = word | self.rs1.into_u32() << 15 | self.rs2.into_u32() << 20;
        Self::field().pack(word, self.imm.unsigned() as u32)
    }
}

/// `B`: two source registers, 13-bit signed LSB-0 immediate (branch offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BFormat {
    pub rs1: RegIndex,
    pub rs2: RegIndex,
    pub imm: Immediate,
}

impl BFormat {
    fn field() -> Field {
        Field::new(vec![(8..12, 1..5), (25..31, 5..11), (7..8, 11..12), (31..32, 12..13)], 0)
    }

    pub(crate) fn decode(word: u32) -> Self {
        let mut imm = Immediate::new(13, true, true);
        imm.set_from_bits(u64::from(Self::field().extract(word))).expect("13-bit field always in range");
        Self { rs1: reg(word, 15..20), rs2: reg(word, 20..25), imm }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        let word = word | self.rs1.into_u32() << 15 | self.rs2.into_u32() << 20;
        Self::field().pack(word, self.imm.unsigned() as u32)
    }
}

/// `U`: one destination register, 20-bit immediate occupying bits `[12:32)` (`lui`,
/// `auipc`). The immediate's value is the full 32-bit pattern with the low 12 bits clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UFormat {
    pub rd: RegIndex,
    pub imm: Immediate,
}

impl UFormat {
    pub(crate) fn decode(word: u32) -> Self {
        let mut imm = Immediate::new(32, true, false);
        imm.set_from_bits(u64::from(word & 0xFFFF_F000)).expect("already within i32 range");
        Self { rd: reg(word, 7..12), imm }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        word | self.rd.into_u32() << 7 | (self.imm.unsigned() as u32 & 0xFFFF_F000)
    }
}

/// `J`: one destination register, 21-bit signed LSB-0 immediate (`jal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JFormat {
    pub rd: RegIndex,
    pub imm: Immediate,
}

impl JFormat {
    fn field() -> Field {
        Field::new(vec![(21..31, 1..11), (20..21, 11..12), (12..20, 12..20), (31..32, 20..21)], 0)
    }

    pub(crate) fn decode(word: u32) -> Self {
        let mut imm = Immediate::new(21, true, true);
        imm.set_from_bits(u64::from(Self::field().extract(word))).expect("21-bit field always in range");
        Self { rd: reg(word, 7..12), imm }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        let word = word | self.rd.into_u32() << 7;
        Self::field().pack(word, self.imm.unsigned() as u32)
    }
}

/// `AMO`: the atomic-memory-operation layout. `rs2` is unused (encoded as zero) by `lr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AmoFormat {
    pub rd: RegIndex,
    pub rs1: RegIndex,
    pub rs2: RegIndex,
    pub aq: bool,
    pub rl: bool,
}

impl AmoFormat {
    pub(crate) fn decode(word: u32) -> Self {
        Self {
            rd: reg(word, 7..12),
            rs1: reg(word, 15..20),
            rs2: reg(word, 20..25),
            rl: extract(word, 25..26) != 0,
            aq: extract(word, 26..27) != 0,
        }
    }

    pub(crate) fn encode(&self, word: u32) -> u32 {
        word
            | self.rd.into_u32() << 7
            | self.rs1.into_u32() << 15
            | self.rs2.into_u32() << 20
            | u32::from(self.rl) << 25
            | u32::from(self.aq) << 26
    }
}

/// `CR` (compressed register-register): `rd`/`rs1` and `rs2`, no immediate. Used here by
/// `c.mv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CrFormat {
    pub rd: RegIndex,
    pub rs2: RegIndex,
}

impl CrFormat {
    pub(crate) fn decode(word: u16) -> Self {
        let word = u32::from(word);
        Self { rd: reg(word, 7..12), rs2: reg(word, 2..7) }
    }

    pub(crate) fn encode(&self, word: u16) -> u16 {
        word | (self.rd.into_u32() as u16) << 7 | (self.rs2.into_u32() as u16) << 2
    }
}

/// `CI` (compressed immediate): a single `rd`/`rs1` plus a 6-bit signed LSB-0... here,
/// non-LSB-0 immediate scattered across `[2:7)` (low 5 bits) and `[12:13)` (sign bit). Used
/// by `c.addi`, `c.andi`, `c.li`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CiFormat {
    pub rd: RegIndex,
    pub imm: Immediate,
}

impl CiFormat {
    fn field() -> Field {
        Field::new(vec![(2..7, 0..5), (12..13, 5..6)], 0)
    }

    pub(crate) fn decode(word: u16) -> Self {
        let word = u32::from(word);
        let mut imm = Immediate::new(6, true, false);
        imm.set_from_bits(u64::from(Self::field().extract(word))).expect("6-bit field always in range");
        Self { rd: reg(word, 7..12), imm }
    }

    pub(crate) fn encode(&self, word: u16) -> u16 {
        let word32 = Self::field().pack(u32::from(word), self.imm.unsigned() as u32);
        (word32 as u16) | (self.rd.into_u32() as u16) << 7
    }
}

/// `CSS` (compressed stack-relative store): `rs2` plus a 6-bit unsigned field scattered
/// across `[9:13)` (low 4 bits) and `[7:9)` (high 2 bits); `decode`/`encode` scale it by 4
/// to/from the byte offset `c.swsp`'s `imm` holds (imm[7:2], word-aligned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CssFormat {
    pub rs2: RegIndex,
    pub imm: Immediate,
}

impl CssFormat {
    fn field() -> Field {
        Field::new(vec![(9..13, 0..4), (7..9, 4..6)], 0)
    }

    pub(crate) fn decode(word: u16) -> Self {
        let word = u32::from(word);
        let raw = Self::field().extract(word);
        let mut imm = Immediate::new(8, false, false);
        imm.set_from_bits(u64::from(raw) * 4).expect("6-bit field scaled by 4 always in range");
        Self { rs2: reg(word, 2..7), imm }
    }

    pub(crate) fn encode(&self, word: u16) -> u16 {
        let raw = self.imm.unsigned() as u32 / 4;
        let word32 = Self::field().pack(u32::from(word), raw);
        (word32 as u16) | (self.rs2.into_u32() as u16) << 2
    }
}

/// `CB` (compressed branch): a 3-bit compressed source register (`x8`-`x15`) and a 9-bit
/// signed LSB-0 offset scattered across the word the way the real RVC encoding scatters it
/// (bit order only matters for round-tripping here, since this is a decoded-word model, not
/// a byte-for-byte ABI). Used by `c.beqz`/`c.bnez`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CbFormat {
    pub rs1: RegIndex,
    pub imm: Immediate,
}

impl CbFormat {
    fn field() -> Field {
        Field::new(
            vec![(3..5, 1..3), (5..7, 3..5), (2..3, 5..6), (10..12, 6..8), (12..13, 8..9)],
            0,
        )
    }

    pub(crate) fn decode(word: u16) -> Self {
        let word = u32::from(word);
        let mut imm = Immediate::new(9, true, true);
        imm.set_from_bits(u64::from(Self::field().extract(word))).expect("9-bit field always in range");
        Self { rs1: compressed_reg(word, 7..10), imm }
    }

    pub(crate) fn encode(&self, word: u16) -> u16 {
        let word32 = Self::field().pack(u32::from(word), self.imm.unsigned() as u32);
        (word32 as u16) | ((self.rs1.into_u32() - 8) as u16) << 7
    }
}

/// The 3-bit compressed register encoding (`000..=111` mapping to `x8..=x15`).
fn compressed_reg(word: u32, range: std::ops::Range<u32>) -> RegIndex {
    RegIndex::try_from(extract(word, range) + 8).expect("3-bit field plus 8 always fits a register index")
}

/// Sign-extends a raw field as if it were a 32-bit two's-complement value; used by callers
/// that need `i64` rather than going through [`Immediate`] (e.g. the disassembler).
pub(crate) fn sext32(value: u32) -> i64 {
    sign_extend(u64::from(value), 32)
}
