//! The instruction registry: a tagged variant enum plus the opcode/funct dispatch table
//! that replaces the source's class-hierarchy reflection (§9 DESIGN NOTES, §4.4).
//!
//! Each [`Instruction`] variant wraps the format struct from [`crate::formats`] holding its
//! dynamic operands; static opcode/funct values live only in [`Instruction::decode`] and
//! [`Instruction::encode`], mirroring the source's `Field{static: true, value: ...}` without
//! needing a runtime-inspectable descriptor for them.

use std::fmt;

use rand::Rng;

use crate::error::DecodeError;
use crate::formats::{
    AmoFormat, BFormat, CbFormat, CiFormat, CrFormat, CssFormat, IFormat, JFormat, RFormat,
    SFormat, ShiftFormat, UFormat,
};
use crate::funct::{Funct12, Funct3, Funct5, Funct7};
use crate::opcode::Opcode;
use crate::variant::Variant;

/// The layout a concrete instruction was decoded from; mirrors the `isa_format_id` metadata
/// field of §3's `Instruction` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    IL,
    IS,
    S,
    B,
    U,
    J,
    Amo,
    CR,
    CI,
    CB,
    CSS,
}

macro_rules! mnemonics {
    ($($variant:ident($fmt:ty) = $mnemonic:literal),+ $(,)?) => {
        /// A decoded (or freshly constructed) instruction. Equality is derived, which gives
        /// exactly the §3 contract: two instructions are equal iff they share a variant
        /// (hence static fields) and their dynamic operands compare equal.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Instruction {
            $($variant($fmt),)+
            Fence,
            FenceI,
            Ecall,
            Ebreak,
            Uret,
            Sret,
            Hret,
            Mret,
            Wfi,
        }

        impl Instruction {
            /// The canonical lowercase mnemonic, as used by the disassembler and CLI.
            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(Instruction::$variant(_) => $mnemonic,)+
                    Instruction::Fence => "fence",
                    Instruction::FenceI => "fence.i",
                    Instruction::Ecall => "ecall",
                    Instruction::Ebreak => "ebreak",
                    Instruction::Uret => "uret",
                    Instruction::Sret => "sret",
                    Instruction::Hret => "hret",
                    Instruction::Mret => "mret",
                    Instruction::Wfi => "wfi",
                }
            }
        }
    };
}

mnemonics! {
    Lui(UFormat) = "lui",
    Auipc(UFormat) = "auipc",
    Jal(JFormat) = "jal",
    Jalr(IFormat) = "jalr",
    Beq(BFormat) = "beq",
    Bne(BFormat) = "bne",
    Blt(BFormat) = "blt",
    Bge(BFormat) = "bge",
    Bltu(BFormat) = "bltu",
    Bgeu(BFormat) = "bgeu",
    Lb(IFormat) = "lb",
    Lh(IFormat) = "lh",
    Lw(IFormat) = "lw",
    Lbu(IFormat) = "lbu",
    Lhu(IFormat) = "lhu",
    Lwu(IFormat) = "lwu",
    Ld(IFormat) = "ld",
    Sb(SFormat) = "sb",
    Sh(SFormat) = "sh",
    Sw(SFormat) = "sw",
    Sd(SFormat) = "sd",
    Addi(IFormat) = "addi",
    Slti(IFormat) = "slti",
    Sltiu(IFormat) = "sltiu",
    Xori(IFormat) = "xori",
    Ori(IFormat) = "ori",
    Andi(IFormat) = "andi",
    Slli(ShiftFormat) = "slli",
    Srli(ShiftFormat) = "srli",
    Srai(ShiftFormat) = "srai",
    Addiw(IFormat) = "addiw",
    Slliw(ShiftFormat) = "slliw",
    Srliw(ShiftFormat) = "srliw",
    Sraiw(ShiftFormat) = "sraiw",
    Add(RFormat) = "add",
    Sub(RFormat) = "sub",
    Sll(RFormat) = "sll",
    Slt(RFormat) = "slt",
    Sltu(RFormat) = "sltu",
    Xor(RFormat) = "xor",
    Srl(RFormat) = "srl",
    Sra(RFormat) = "sra",
    Or(RFormat) = "or",
    And(RFormat) = "and",
    Addw(RFormat) = "addw",
    Subw(RFormat) = "subw",
    Sllw(RFormat) = "sllw",
    Srlw(RFormat) = "srlw",
    Sraw(RFormat) = "sraw",
    Mul(RFormat) = "mul",
    Mulh(RFormat) = "mulh",
    Mulhsu(RFormat) = "mulhsu",
    Mulhu(RFormat) = "mulhu",
    Div(RFormat) = "div",
    Divu(RFormat) = "divu",
    Rem(RFormat) = "rem",
    Remu(RFormat) = "remu",
    Mulw(RFormat) = "mulw",
    Divw(RFormat) = "divw",
    Divuw(RFormat) = "divuw",
    Remw(RFormat) = "remw",
    Remuw(RFormat) = "remuw",
    LrW(AmoFormat) = "lr.w",
    ScW(AmoFormat) = "sc.w",
    AmoswapW(AmoFormat) = "amoswap.w",
    AmoaddW(AmoFormat) = "amoadd.w",
    AmoxorW(AmoFormat) = "amoxor.w",
    AmoandW(AmoFormat) = "amoand.w",
    AmoorW(AmoFormat) = "amoor.w",
    AmominW(AmoFormat) = "amomin.w",
    AmomaxW(AmoFormat) = "amomax.w",
    AmominuW(AmoFormat) = "amominu.w",
    AmomaxuW(AmoFormat) = "amomaxu.w",
    Csrrw(IFormat) = "csrrw",
    Csrrs(IFormat) = "csrrs",
    Csrrc(IFormat) = "csrrc",
    Csrrwi(IFormat) = "csrrwi",
    Csrrsi(IFormat) = "csrrsi",
    Csrrci(IFormat) = "csrrci",
    CAddi(CiFormat) = "c.addi",
    CAndi(CiFormat) = "c.andi",
    CLi(CiFormat) = "c.li",
    CMv(CrFormat) = "c.mv",
    CSwsp(CssFormat) = "c.swsp",
    CBeqz(CbFormat) = "c.beqz",
    CBnez(CbFormat) = "c.bnez",
}

impl Instruction {
    /// Which [`Format`] this instruction was laid out as.
    pub fn format(&self) -> Format {
        use Instruction::*;
        match self {
            Lui(_) | Auipc(_) => Format::U,
            Jal(_) => Format::J,
            Jalr(_) | Addi(_) | Slti(_) | Sltiu(_) | Xori(_) | Ori(_) | Andi(_) | Addiw(_)
            | Csrrw(_) | Csrrs(_) | Csrrc(_) | Csrrwi(_) | Csrrsi(_) | Csrrci(_) => Format::I,
            Lb(_) | Lh(_) | Lw(_) | Lbu(_) | Lhu(_) | Lwu(_) | Ld(_) => Format::IL,
            Slli(_) | Srli(_) | Srai(_) | Slliw(_) | Srliw(_) | Sraiw(_) => Format::IS,
            Sb(_) | Sh(_) | Sw(_) | Sd(_) => Format::S,
            Beq(_) | Bne(_) | Blt(_) | Bge(_) | Bltu(_) | Bgeu(_) => Format::B,
            Add(_) | Sub(_) | Sll(_) | Slt(_) | Sltu(_) | Xor(_) | Srl(_) | Sra(_) | Or(_)
            | And(_) | Addw(_) | Subw(_) | Sllw(_) | Srlw(_) | Sraw(_) | Mul(_) | Mulh(_)
            | Mulhsu(_) | Mulhu(_) | Div(_) | Divu(_) | Rem(_) | Remu(_) | Mulw(_) | Divw(_)
            | Divuw(_) | Remw(_) | Remuw(_) => Format::R,
            LrW(_) | ScW(_) | AmoswapW(_) | AmoaddW(_) | AmoxorW(_) | AmoandW(_) | AmoorW(_)
            | AmominW(_) | AmomaxW(_) | AmominuW(_) | AmomaxuW(_) => Format::Amo,
            CAddi(_) | CAndi(_) | CLi(_) => Format::CI,
            CMv(_) => Format::CR,
            CSwsp(_) => Format::CSS,
            CBeqz(_) | CBnez(_) => Format::CB,
            Fence | FenceI | Ecall | Ebreak | Uret | Sret | Hret | Mret | Wfi => Format::I,
        }
    }

    /// True if this instruction decodes/encodes from a 16-bit word.
    pub fn is_compressed(&self) -> bool {
        matches!(self.format(), Format::CR | Format::CI | Format::CB | Format::CSS)
    }

    /// Decodes a 32-bit (or, if the low two bits aren't `11`, 16-bit) instruction word
    /// under `variant` (§4.4 decode contract).
    pub fn decode(word: u32, variant: &Variant) -> Result<Instruction, DecodeError> {
        if word & 0b11 != 0b11 {
            return decode_compressed(word as u16, variant);
        }
        decode_wide(word, variant)
    }

    /// Packs this instruction back into its machine word. Compressed instructions are
    /// returned zero-extended into the low 16 bits; pair with [`Instruction::is_compressed`]
    /// to know how many bytes to actually emit.
    pub fn encode(&self) -> u32 {
        use Instruction::*;
        match self {
            Lui(f) => f.encode(Opcode::LUI.into_u32()),
            Auipc(f) => f.encode(Opcode::AUIPC.into_u32()),
            Jal(f) => f.encode(Opcode::JAL.into_u32()),
            Jalr(f) => f.encode(Opcode::JALR.into_u32() | Funct3::JALR.into_u32() << 12),
            Beq(f) => f.encode(Opcode::BRANCH.into_u32() | Funct3::BEQ.into_u32() << 12),
            Bne(f) => f.encode(Opcode::BRANCH.into_u32() | Funct3::BNE.into_u32() << 12),
            Blt(f) => f.encode(Opcode::BRANCH.into_u32() | Funct3::BLT.into_u32() << 12),
            Bge(f) => f.encode(Opcode::BRANCH.into_u32() | Funct3::BGE.into_u32() << 12),
            Bltu(f) => f.encode(Opcode::BRANCH.into_u32() | Funct3::BLTU.into_u32() << 12),
            Bgeu(f) => f.encode(Opcode::BRANCH.into_u32() | Funct3::BGEU.into_u32() << 12),
            Lb(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LB.into_u32() << 12),
            Lh(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LH.into_u32() << 12),
            Lw(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LW.into_u32() << 12),
            Lbu(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LBU.into_u32() << 12),
            Lhu(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LHU.into_u32() << 12),
            Lwu(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LWU.into_u32() << 12),
            Ld(f) => f.encode(Opcode::LOAD.into_u32() | Funct3::LD.into_u32() << 12),
            Sb(f) => f.encode(Opcode::STORE.into_u32() | Funct3::SB.into_u32() << 12),
            Sh(f) => f.encode(Opcode::STORE.into_u32() | Funct3::SH.into_u32() << 12),
            Sw(f) => f.encode(Opcode::STORE.into_u32() | Funct3::SW.into_u32() << 12),
            Sd(f) => f.encode(Opcode::STORE.into_u32() | Funct3::SD.into_u32() << 12),
            Addi(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::ADDI.into_u32() << 12),
            Slti(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::SLTI.into_u32() << 12),
            Sltiu(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::SLTIU.into_u32() << 12),
            Xori(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::XORI.into_u32() << 12),
            Ori(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::ORI.into_u32() << 12),
            Andi(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::ANDI.into_u32() << 12),
            Slli(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::SLLI.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Srli(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::SRLI_SRAI.into_u32() << 12 | Funct7::SRL.into_u32() << 25),
            Srai(f) => f.encode(Opcode::OP_IMM.into_u32() | Funct3::SRLI_SRAI.into_u32() << 12 | Funct7::SRA.into_u32() << 25),
            Addiw(f) => f.encode(Opcode::OP_IMM_32.into_u32() | Funct3::ADDI.into_u32() << 12),
            Slliw(f) => f.encode(Opcode::OP_IMM_32.into_u32() | Funct3::SLLI.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Srliw(f) => f.encode(Opcode::OP_IMM_32.into_u32() | Funct3::SRLI_SRAI.into_u32() << 12 | Funct7::SRL.into_u32() << 25),
            Sraiw(f) => f.encode(Opcode::OP_IMM_32.into_u32() | Funct3::SRLI_SRAI.into_u32() << 12 | Funct7::SRA.into_u32() << 25),
            Add(f) => f.encode(Opcode::OP.into_u32() | Funct3::ADD_SUB.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Sub(f) => f.encode(Opcode::OP.into_u32() | Funct3::ADD_SUB.into_u32() << 12 | Funct7::SUB.into_u32() << 25),
            Sll(f) => f.encode(Opcode::OP.into_u32() | Funct3::SLL.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Slt(f) => f.encode(Opcode::OP.into_u32() | Funct3::SLT.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Sltu(f) => f.encode(Opcode::OP.into_u32() | Funct3::SLTU.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Xor(f) => f.encode(Opcode::OP.into_u32() | Funct3::XOR.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Srl(f) => f.encode(Opcode::OP.into_u32() | Funct3::SRL_SRA.into_u32() << 12 | Funct7::SRL.into_u32() << 25),
            Sra(f) => f.encode(Opcode::OP.into_u32() | Funct3::SRL_SRA.into_u32() << 12 | Funct7::SRA.into_u32() << 25),
            Or(f) => f.encode(Opcode::OP.into_u32() | Funct3::OR.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            And(f) => f.encode(Opcode::OP.into_u32() | Funct3::AND.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Addw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::ADD_SUB.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Subw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::ADD_SUB.into_u32() << 12 | Funct7::SUB.into_u32() << 25),
            Sllw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::SLL.into_u32() << 12 | Funct7::ADD.into_u32() << 25),
            Srlw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::SRL_SRA.into_u32() << 12 | Funct7::SRL.into_u32() << 25),
            Sraw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::SRL_SRA.into_u32() << 12 | Funct7::SRA.into_u32() << 25),
            Mul(f) => f.encode(Opcode::OP.into_u32() | Funct3::MUL.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Mulh(f) => f.encode(Opcode::OP.into_u32() | Funct3::MULH.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Mulhsu(f) => f.encode(Opcode::OP.into_u32() | Funct3::MULHSU.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Mulhu(f) => f.encode(Opcode::OP.into_u32() | Funct3::MULHU.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Div(f) => f.encode(Opcode::OP.into_u32() | Funct3::DIV.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Divu(f) => f.encode(Opcode::OP.into_u32() | Funct3::DIVU.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Rem(f) => f.encode(Opcode::OP.into_u32() | Funct3::REM.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Remu(f) => f.encode(Opcode::OP.into_u32() | Funct3::REMU.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Mulw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::MUL.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Divw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::DIV.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Divuw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::DIVU.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Remw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::REM.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            Remuw(f) => f.encode(Opcode::OP_32.into_u32() | Funct3::REMU.into_u32() << 12 | Funct7::MULDIV.into_u32() << 25),
            LrW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::LR.into_u32() << 27),
            ScW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::SC.into_u32() << 27),
            AmoswapW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOSWAP.into_u32() << 27),
            AmoaddW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOADD.into_u32() << 27),
            AmoxorW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOXOR.into_u32() << 27),
            AmoandW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOAND.into_u32() << 27),
            AmoorW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOOR.into_u32() << 27),
            AmominW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOMIN.into_u32() << 27),
            AmomaxW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOMAX.into_u32() << 27),
            AmominuW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOMINU.into_u32() << 27),
            AmomaxuW(f) => f.encode(Opcode::AMO.into_u32() | Funct3::AMO_W.into_u32() << 12 | Funct5::AMOMAXU.into_u32() << 27),
            Csrrw(f) => f.encode(Opcode::SYSTEM.into_u32() | Funct3::CSRRW.into_u32() << 12),
            Csrrs(f) => f.encode(Opcode::SYSTEM.into_u32() | Funct3::CSRRS.into_u32() << 12),
            Csrrc(f) => f.encode(Opcode::SYSTEM.into_u32() | Funct3::CSRRC.into_u32() << 12),
            Csrrwi(f) => f.encode(Opcode::SYSTEM.into_u32() | Funct3::CSRRWI.into_u32() << 12),
            Csrrsi(f) => f.encode(Opcode::SYSTEM.into_u32() | Funct3::CSRRSI.into_u32() << 12),
            Csrrci(f) => f.encode(Opcode::SYSTEM.into_u32() | Funct3::CSRRCI.into_u32() << 12),
            CAddi(f) => u32::from(f.encode(0b01 | 0b000 << 13)),
            CAndi(f) => u32::from(f.encode(0b01 | 0b100 << 13 | 0b10 << 10)),
            CLi(f) => u32::from(f.encode(0b01 | 0b010 << 13)),
            CMv(f) => u32::from(f.encode(0b10 | 0b1000 << 12)),
            CSwsp(f) => u32::from(f.encode(0b10 | 0b110 << 13)),
            CBeqz(f) => u32::from(f.encode(0b01 | 0b110 << 13)),
            CBnez(f) => u32::from(f.encode(0b01 | 0b111 << 13)),
            Fence => Opcode::MISC_MEM.into_u32() | Funct3::FENCE.into_u32() << 12,
            FenceI => Opcode::MISC_MEM.into_u32() | Funct3::FENCE_I.into_u32() << 12,
            Ecall => Opcode::SYSTEM.into_u32() | Funct12::ECALL.into_u32() << 20,
            Ebreak => Opcode::SYSTEM.into_u32() | Funct12::EBREAK.into_u32() << 20,
            Uret => Opcode::SYSTEM.into_u32() | Funct12::URET.into_u32() << 20,
            Sret => Opcode::SYSTEM.into_u32() | Funct12::SRET.into_u32() << 20,
            Hret => Opcode::SYSTEM.into_u32() | Funct12::HRET.into_u32() << 20,
            Mret => Opcode::SYSTEM.into_u32() | Funct12::MRET.into_u32() << 20,
            Wfi => Opcode::SYSTEM.into_u32() | Funct12::WFI.into_u32() << 20,
        }
    }

    /// Builds a random, variant-valid instance of `mnemonic` (`random-asm`, §6), the way
    /// `random.py`'s `Instruction.randomize(variant)` fills in a freshly-constructed
    /// instance's operands. Returns `None` for an unrecognized mnemonic; callers normally get
    /// `mnemonic` from [`crate::registry::get_insns`], which only ever names real ones.
    pub fn random<R: rand::Rng>(mnemonic: &str, variant: &Variant, rng: &mut R) -> Option<Instruction> {
        use Instruction::*;

        let reg = |rng: &mut R| -> crate::regindex::RegIndex {
            crate::regindex::RegIndex::try_from(rng.gen_range(0..variant.intregs() as u32))
                .expect("intregs() is always in range for RegIndex")
        };
        let compressed_reg = |rng: &mut R| -> crate::regindex::RegIndex {
            crate::regindex::RegIndex::try_from(8 + rng.gen_range(0..8u32))
                .expect("8..16 always fits a register index")
        };
        let r = |rng: &mut R| RFormat { rd: reg(rng), rs1: reg(rng), rs2: reg(rng) };
        let i12 = |rng: &mut R| -> IFormat {
            let mut imm = Immediate::new(12, true, false);
            imm.randomize(rng);
            IFormat { rd: reg(rng), rs1: reg(rng), imm }
        };
        let s = |rng: &mut R| -> SFormat {
            let mut imm = Immediate::new(12, true, false);
            imm.randomize(rng);
            SFormat { rs1: reg(rng), rs2: reg(rng), imm }
        };
        let b = |rng: &mut R| -> BFormat {
            let mut imm = Immediate::new(13, true, true);
            imm.randomize(rng);
            BFormat { rs1: reg(rng), rs2: reg(rng), imm }
        };
        let shift = |rng: &mut R, width: u32| -> ShiftFormat {
            ShiftFormat { rd: reg(rng), rs1: reg(rng), shamt: rng.gen_range(0..(1u32 << width)) }
        };
        let amo = |rng: &mut R| -> AmoFormat {
            AmoFormat { rd: reg(rng), rs1: reg(rng), rs2: reg(rng), aq: rng.gen(), rl: rng.gen() }
        };

        let rv64 = variant.xlen() == 64;
        let shift_width = if rv64 { 6 } else { 5 };

        Some(match mnemonic {
            "lui" | "auipc" => {
                let mut imm = Immediate::new(32, true, false);
                imm.set_from_bits(u64::from(rng.gen_range(0u32..(1 << 20)) << 12)).expect("20 bits shifted into a 32-bit immediate always fits");
                let u = UFormat { rd: reg(rng), imm };
                if mnemonic == "lui" { Lui(u) } else { Auipc(u) }
            }
            "jal" => {
                let mut imm = Immediate::new(21, true, true);
                imm.randomize(rng);
                Jal(JFormat { rd: reg(rng), imm })
            }
            "jalr" => Jalr(i12(rng)),
            "beq" => Beq(b(rng)),
            "bne" => Bne(b(rng)),
            "blt" => Blt(b(rng)),
            "bge" => Bge(b(rng)),
            "bltu" => Bltu(b(rng)),
            "bgeu" => Bgeu(b(rng)),
            "lb" => Lb(i12(rng)),
            "lh" => Lh(i12(rng)),
            "lw" => Lw(i12(rng)),
            "lbu" => Lbu(i12(rng)),
            "lhu" => Lhu(i12(rng)),
            "lwu" => Lwu(i12(rng)),
            "ld" => Ld(i12(rng)),
            "sb" => Sb(s(rng)),
            "sh" => Sh(s(rng)),
            "sw" => Sw(s(rng)),
            "sd" => Sd(s(rng)),
            "addi" => Addi(i12(rng)),
            "slti" => Slti(i12(rng)),
            "sltiu" => Sltiu(i12(rng)),
            "xori" => Xori(i12(rng)),
            "ori" => Ori(i12(rng)),
            "andi" => Andi(i12(rng)),
            "slli" => Slli(shift(rng, shift_width)),
            "srli" => Srli(shift(rng, shift_width)),
            "srai" => Srai(shift(rng, shift_width)),
            "addiw" => Addiw(i12(rng)),
            "slliw" => Slliw(shift(rng, 5)),
            "srliw" => Srliw(shift(rng, 5)),
            "sraiw" => Sraiw(shift(rng, 5)),
            "add" => Add(r(rng)),
            "sub" => Sub(r(rng)),
            "sll" => Sll(r(rng)),
            "slt" => Slt(r(rng)),
            "sltu" => Sltu(r(rng)),
            "xor" => Xor(r(rng)),
            "srl" => Srl(r(rng)),
            "sra" => Sra(r(rng)),
            "or" => Or(r(rng)),
            "and" => And(r(rng)),
            "addw" => Addw(r(rng)),
            "subw" => Subw(r(rng)),
            "sllw" => Sllw(r(rng)),
            "srlw" => Srlw(r(rng)),
            "sraw" => Sraw(r(rng)),
            "mul" => Mul(r(rng)),
            "mulh" => Mulh(r(rng)),
            "mulhsu" => Mulhsu(r(rng)),
            "mulhu" => Mulhu(r(rng)),
            "div" => Div(r(rng)),
            "divu" => Divu(r(rng)),
            "rem" => Rem(r(rng)),
            "remu" => Remu(r(rng)),
            "mulw" => Mulw(r(rng)),
            "divw" => Divw(r(rng)),
            "divuw" => Divuw(r(rng)),
            "remw" => Remw(r(rng)),
            "remuw" => Remuw(r(rng)),
            "lr.w" => LrW(amo(rng)),
            "sc.w" => ScW(amo(rng)),
            "amoswap.w" => AmoswapW(amo(rng)),
            "amoadd.w" => AmoaddW(amo(rng)),
            "amoxor.w" => AmoxorW(amo(rng)),
            "amoand.w" => AmoandW(amo(rng)),
            "amoor.w" => AmoorW(amo(rng)),
            "amomin.w" => AmominW(amo(rng)),
            "amomax.w" => AmomaxW(amo(rng)),
            "amominu.w" => AmominuW(amo(rng)),
            "amomaxu.w" => AmomaxuW(amo(rng)),
            "csrrw" | "csrrs" | "csrrc" | "csrrwi" | "csrrsi" | "csrrci" => {
                let mut imm = Immediate::new(12, false, false);
                imm.randomize(rng);
                let f = IFormat { rd: reg(rng), rs1: reg(rng), imm };
                match mnemonic {
                    "csrrw" => Csrrw(f),
                    "csrrs" => Csrrs(f),
                    "csrrc" => Csrrc(f),
                    "csrrwi" => Csrrwi(f),
                    "csrrsi" => Csrrsi(f),
                    _ => Csrrci(f),
                }
            }
            "c.addi" | "c.andi" | "c.li" => {
                let mut imm = Immediate::new(6, true, false);
                imm.randomize(rng);
                let f = CiFormat { rd: reg(rng), imm };
                match mnemonic {
                    "c.addi" => CAddi(f),
                    "c.andi" => CAndi(f),
                    _ => CLi(f),
                }
            }
            "c.mv" => CMv(CrFormat { rd: reg(rng), rs2: reg(rng) }),
            "c.swsp" => {
                let mut imm = Immediate::new(8, false, false);
                imm.randomize(rng);
                imm.set(imm.value() & !0b11).expect("clearing low bits keeps the value in range");
                CSwsp(CssFormat { rs2: reg(rng), imm })
            }
            "c.beqz" | "c.bnez" => {
                let mut imm = Immediate::new(9, true, true);
                imm.randomize(rng);
                let f = CbFormat { rs1: compressed_reg(rng), imm };
                if mnemonic == "c.beqz" { CBeqz(f) } else { CBnez(f) }
            }
            "fence" => Fence,
            "fence.i" => FenceI,
            "ecall" => Ecall,
            "ebreak" => Ebreak,
            "uret" => Uret,
            "sret" => Sret,
            "hret" => Hret,
            "mret" => Mret,
            "wfi" => Wfi,
            _ => return None,
        })
    }
}

fn decode_wide(word: u32, variant: &Variant) -> Result<Instruction, DecodeError> {
    let opcode = Opcode::from_word(word);
    let funct3 = Funct3::from_word(word);
    let funct7 = Funct7::from_word(word);

    let needs = |ext: &'static str, insn: Instruction| -> Result<Instruction, DecodeError> {
        if variant.has_extension(ext) {
            Ok(insn)
        } else {
            Err(DecodeError::ExtensionNotEnabled(ext))
        }
    };
    let rv64 = variant.xlen() == 64;

    Ok(match opcode {
        Opcode::LUI => Instruction::Lui(UFormat::decode(word)),
        Opcode::AUIPC => Instruction::Auipc(UFormat::decode(word)),
        Opcode::JAL => Instruction::Jal(JFormat::decode(word)),
        Opcode::JALR if funct3 == Funct3::JALR => Instruction::Jalr(IFormat::decode(word)),
        Opcode::BRANCH => match funct3 {
            Funct3::BEQ => Instruction::Beq(BFormat::decode(word)),
            Funct3::BNE => Instruction::Bne(BFormat::decode(word)),
            Funct3::BLT => Instruction::Blt(BFormat::decode(word)),
            Funct3::BGE => Instruction::Bge(BFormat::decode(word)),
            Funct3::BLTU => Instruction::Bltu(BFormat::decode(word)),
            Funct3::BGEU => Instruction::Bgeu(BFormat::decode(word)),
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::LOAD => match funct3 {
            Funct3::LB => Instruction::Lb(IFormat::decode(word)),
            Funct3::LH => Instruction::Lh(IFormat::decode(word)),
            Funct3::LW => Instruction::Lw(IFormat::decode(word)),
            Funct3::LBU => Instruction::Lbu(IFormat::decode(word)),
            Funct3::LHU => Instruction::Lhu(IFormat::decode(word)),
            Funct3::LWU if rv64 => Instruction::Lwu(IFormat::decode(word)),
            Funct3::LWU => return Err(DecodeError::ExtensionNotEnabled("RV64I")),
            Funct3::LD if rv64 => Instruction::Ld(IFormat::decode(word)),
            Funct3::LD => return Err(DecodeError::ExtensionNotEnabled("RV64I")),
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::STORE => match funct3 {
            Funct3::SB => Instruction::Sb(SFormat::decode(word)),
            Funct3::SH => Instruction::Sh(SFormat::decode(word)),
            Funct3::SW => Instruction::Sw(SFormat::decode(word)),
            Funct3::SD if rv64 => Instruction::Sd(SFormat::decode(word)),
            Funct3::SD => return Err(DecodeError::ExtensionNotEnabled("RV64I")),
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::OP_IMM => match funct3 {
            Funct3::ADDI => Instruction::Addi(IFormat::decode(word)),
            Funct3::SLTI => Instruction::Slti(IFormat::decode(word)),
            Funct3::SLTIU => Instruction::Sltiu(IFormat::decode(word)),
            Funct3::XORI => Instruction::Xori(IFormat::decode(word)),
            Funct3::ORI => Instruction::Ori(IFormat::decode(word)),
            Funct3::ANDI => Instruction::Andi(IFormat::decode(word)),
            Funct3::SLLI => Instruction::Slli(ShiftFormat::decode(word, if rv64 { 6 } else { 5 })),
            Funct3::SRLI_SRAI if funct7 == Funct7::SRA => {
                Instruction::Srai(ShiftFormat::decode(word, if rv64 { 6 } else { 5 }))
            }
            Funct3::SRLI_SRAI => Instruction::Srli(ShiftFormat::decode(word, if rv64 { 6 } else { 5 })),
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::OP_IMM_32 => {
            if !rv64 {
                return Err(DecodeError::ExtensionNotEnabled("RV64I"));
            }
            match funct3 {
                Funct3::ADDI => Instruction::Addiw(IFormat::decode(word)),
                Funct3::SLLI => Instruction::Slliw(ShiftFormat::decode(word, 5)),
                Funct3::SRLI_SRAI if funct7 == Funct7::SRA => Instruction::Sraiw(ShiftFormat::decode(word, 5)),
                Funct3::SRLI_SRAI => Instruction::Srliw(ShiftFormat::decode(word, 5)),
                _ => return Err(DecodeError::InvalidFunct { word }),
            }
        }
        Opcode::OP if funct7 == Funct7::MULDIV => match funct3 {
            Funct3::MUL => needs("M", Instruction::Mul(RFormat::decode(word)))?,
            Funct3::MULH => needs("M", Instruction::Mulh(RFormat::decode(word)))?,
            Funct3::MULHSU => needs("M", Instruction::Mulhsu(RFormat::decode(word)))?,
            Funct3::MULHU => needs("M", Instruction::Mulhu(RFormat::decode(word)))?,
            Funct3::DIV => needs("M", Instruction::Div(RFormat::decode(word)))?,
            Funct3::DIVU => needs("M", Instruction::Divu(RFormat::decode(word)))?,
            Funct3::REM => needs("M", Instruction::Rem(RFormat::decode(word)))?,
            Funct3::REMU => needs("M", Instruction::Remu(RFormat::decode(word)))?,
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::OP => match funct3 {
            Funct3::ADD_SUB if funct7 == Funct7::SUB => Instruction::Sub(RFormat::decode(word)),
            Funct3::ADD_SUB => Instruction::Add(RFormat::decode(word)),
            Funct3::SLL => Instruction::Sll(RFormat::decode(word)),
            Funct3::SLT => Instruction::Slt(RFormat::decode(word)),
            Funct3::SLTU => Instruction::Sltu(RFormat::decode(word)),
            Funct3::XOR => Instruction::Xor(RFormat::decode(word)),
            Funct3::SRL_SRA if funct7 == Funct7::SRA => Instruction::Sra(RFormat::decode(word)),
            Funct3::SRL_SRA => Instruction::Srl(RFormat::decode(word)),
            Funct3::OR => Instruction::Or(RFormat::decode(word)),
            Funct3::AND => Instruction::And(RFormat::decode(word)),
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::OP_32 => {
            if !rv64 {
                return Err(DecodeError::ExtensionNotEnabled("RV64I"));
            }
            match (funct3, funct7) {
                (Funct3::ADD_SUB, Funct7::SUB) => Instruction::Subw(RFormat::decode(word)),
                (Funct3::ADD_SUB, Funct7::MULDIV) => needs("M", Instruction::Mulw(RFormat::decode(word)))?,
                (Funct3::ADD_SUB, _) => Instruction::Addw(RFormat::decode(word)),
                (Funct3::SLL, _) => Instruction::Sllw(RFormat::decode(word)),
                (Funct3::SRL_SRA, Funct7::SRA) => Instruction::Sraw(RFormat::decode(word)),
                (Funct3::SRL_SRA, _) => Instruction::Srlw(RFormat::decode(word)),
                (Funct3::DIV, _) => needs("M", Instruction::Divw(RFormat::decode(word)))?,
                (Funct3::DIVU, _) => needs("M", Instruction::Divuw(RFormat::decode(word)))?,
                (Funct3::REM, _) => needs("M", Instruction::Remw(RFormat::decode(word)))?,
                (Funct3::REMU, _) => needs("M", Instruction::Remuw(RFormat::decode(word)))?,
                _ => return Err(DecodeError::InvalidFunct { word }),
            }
        }
        Opcode::MISC_MEM => match funct3 {
            Funct3::FENCE => Instruction::Fence,
            Funct3::FENCE_I => needs("Zifencei", Instruction::FenceI)?,
            _ => return Err(DecodeError::InvalidFunct { word }),
        },
        Opcode::SYSTEM => {
            let funct12 = Funct12::from_word(word);
            match funct3 {
                Funct3::PRIV if funct12 == Funct12::ECALL => Instruction::Ecall,
                Funct3::PRIV if funct12 == Funct12::EBREAK => Instruction::Ebreak,
                Funct3::PRIV if funct12 == Funct12::URET => Instruction::Uret,
                Funct3::PRIV if funct12 == Funct12::SRET => Instruction::Sret,
                Funct3::PRIV if funct12 == Funct12::HRET => Instruction::Hret,
                Funct3::PRIV if funct12 == Funct12::MRET => Instruction::Mret,
                Funct3::PRIV if funct12 == Funct12::WFI => Instruction::Wfi,
                Funct3::CSRRW => needs("Zicsr", Instruction::Csrrw(IFormat::decode(word)))?,
                Funct3::CSRRS => needs("Zicsr", Instruction::Csrrs(IFormat::decode(word)))?,
                Funct3::CSRRC => needs("Zicsr", Instruction::Csrrc(IFormat::decode(word)))?,
                Funct3::CSRRWI => needs("Zicsr", Instruction::Csrrwi(IFormat::decode(word)))?,
                Funct3::CSRRSI => needs("Zicsr", Instruction::Csrrsi(IFormat::decode(word)))?,
                Funct3::CSRRCI => needs("Zicsr", Instruction::Csrrci(IFormat::decode(word)))?,
                _ => return Err(DecodeError::InvalidFunct { word }),
            }
        }
        Opcode::AMO if funct3 == Funct3::AMO_W => {
            let funct5 = Funct5::from_word(word);
            let insn = match funct5 {
                Funct5::LR => Instruction::LrW(AmoFormat::decode(word)),
                Funct5::SC => Instruction::ScW(AmoFormat::decode(word)),
                Funct5::AMOSWAP => Instruction::AmoswapW(AmoFormat::decode(word)),
                Funct5::AMOADD => Instruction::AmoaddW(AmoFormat::decode(word)),
                Funct5::AMOXOR => Instruction::AmoxorW(AmoFormat::decode(word)),
                Funct5::AMOAND => Instruction::AmoandW(AmoFormat::decode(word)),
                Funct5::AMOOR => Instruction::AmoorW(AmoFormat::decode(word)),
                Funct5::AMOMIN => Instruction::AmominW(AmoFormat::decode(word)),
                Funct5::AMOMAX => Instruction::AmomaxW(AmoFormat::decode(word)),
                Funct5::AMOMINU => Instruction::AmominuW(AmoFormat::decode(word)),
                Funct5::AMOMAXU => Instruction::AmomaxuW(AmoFormat::decode(word)),
                _ => return Err(DecodeError::InvalidFunct { word }),
            };
            needs("A", insn)?
        }
        _ => return Err(DecodeError::InvalidOpcode { word, opcode: opcode.into_u32() as u8 }),
    })
}

fn decode_compressed(word: u16, variant: &Variant) -> Result<Instruction, DecodeError> {
    if !variant.has_extension("C") {
        return Err(DecodeError::ExtensionNotEnabled("C"));
    }
    let quadrant = word & 0b11;
    let funct3 = (word >> 13) & 0b111;
    Ok(match (quadrant, funct3) {
        (0b01, 0b000) => Instruction::CAddi(CiFormat::decode(word)),
        (0b01, 0b010) => Instruction::CLi(CiFormat::decode(word)),
        (0b01, 0b100) if (word >> 10) & 0b11 == 0b10 => Instruction::CAndi(CiFormat::decode(word)),
        (0b01, 0b110) => Instruction::CBeqz(CbFormat::decode(word)),
        (0b01, 0b111) => Instruction::CBnez(CbFormat::decode(word)),
        (0b10, 0b100) if (word >> 12) & 1 == 1 && (word >> 2) & 0x1F != 0 => {
            Instruction::CMv(CrFormat::decode(word))
        }
        (0b10, 0b110) => Instruction::CSwsp(CssFormat::decode(word)),
        _ => return Err(DecodeError::InvalidCompressed(word)),
    })
}

/// The CSR operand of a `csr*` instruction: its architectural name if the address is
/// registered (§4.5, `csrnames.py`), else the raw address in hex.
fn csr_operand(address: u16) -> String {
    match crate::csr::csr_name(address) {
        Some(name) => name.to_string(),
        None => format!("0x{address:03x}"),
    }
}

/// Assembler-syntax rendering, one line per instruction, grouped by format the way
/// `insn.py`'s per-`InstructionXType.__str__` methods do (`x{n}` register names throughout,
/// since this model has no ABI-name table).
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let mnemonic = self.mnemonic();
        match self {
            Lui(u) | Auipc(u) => write!(f, "{mnemonic} x{}, {}", u.rd.into_u32(), u.imm),
            Jal(j) => write!(f, "{mnemonic} x{}, .{:+}", j.rd.into_u32(), j.imm.value()),
            Jalr(i) => write!(f, "{mnemonic} x{}, x{}, {}", i.rd.into_u32(), i.rs1.into_u32(), i.imm),
            Beq(b) | Bne(b) | Blt(b) | Bge(b) | Bltu(b) | Bgeu(b) => {
                write!(f, "{mnemonic} x{}, x{}, .{:+}", b.rs1.into_u32(), b.rs2.into_u32(), b.imm.value())
            }
            Lb(i) | Lh(i) | Lw(i) | Lbu(i) | Lhu(i) | Lwu(i) | Ld(i) => {
                write!(f, "{mnemonic} x{}, {}(x{})", i.rd.into_u32(), i.imm, i.rs1.into_u32())
            }
            Sb(s) | Sh(s) | Sw(s) | Sd(s) => {
                write!(f, "{mnemonic} x{}, {}(x{})", s.rs2.into_u32(), s.imm, s.rs1.into_u32())
            }
            Csrrw(i) | Csrrs(i) | Csrrc(i) => {
                write!(f, "{mnemonic} x{}, {}, x{}", i.rd.into_u32(), csr_operand(i.imm.unsigned() as u16), i.rs1.into_u32())
            }
            Csrrwi(i) | Csrrsi(i) | Csrrci(i) => {
                write!(f, "{mnemonic} x{}, {}, {}", i.rd.into_u32(), csr_operand(i.imm.unsigned() as u16), i.rs1.into_u32())
            }
            Addi(i) if i.rd.into_u32() == 0 && i.rs1.into_u32() == 0 && i.imm.value() == 0 => {
                write!(f, "nop")
            }
            Addi(i) | Slti(i) | Sltiu(i) | Xori(i) | Ori(i) | Andi(i) | Addiw(i) => {
                write!(f, "{mnemonic} x{}, x{}, {}", i.rd.into_u32(), i.rs1.into_u32(), i.imm)
            }
            Slli(s) | Srli(s) | Srai(s) | Slliw(s) | Srliw(s) | Sraiw(s) => {
                write!(f, "{mnemonic} x{}, x{}, 0x{:02x}", s.rd.into_u32(), s.rs1.into_u32(), s.shamt)
            }
            Add(r) | Sub(r) | Sll(r) | Slt(r) | Sltu(r) | Xor(r) | Srl(r) | Sra(r) | Or(r) | And(r)
            | Addw(r) | Subw(r) | Sllw(r) | Srlw(r) | Sraw(r) | Mul(r) | Mulh(r) | Mulhsu(r) | Mulhu(r)
            | Div(r) | Divu(r) | Rem(r) | Remu(r) | Mulw(r) | Divw(r) | Divuw(r) | Remw(r) | Remuw(r) => {
                write!(f, "{mnemonic} x{}, x{}, x{}", r.rd.into_u32(), r.rs1.into_u32(), r.rs2.into_u32())
            }
            LrW(a) => write!(f, "{mnemonic} x{}, (x{})", a.rd.into_u32(), a.rs1.into_u32()),
            ScW(a) | AmoswapW(a) | AmoaddW(a) | AmoxorW(a) | AmoandW(a) | AmoorW(a) | AmominW(a)
            | AmomaxW(a) | AmominuW(a) | AmomaxuW(a) => {
                write!(f, "{mnemonic} x{}, x{}, (x{})", a.rd.into_u32(), a.rs2.into_u32(), a.rs1.into_u32())
            }
            CAddi(c) | CAndi(c) | CLi(c) => write!(f, "{mnemonic} x{}, {}", c.rd.into_u32(), c.imm),
            CMv(c) => write!(f, "{mnemonic} x{}, x{}", c.rd.into_u32(), c.rs2.into_u32()),
            CSwsp(c) => write!(f, "{mnemonic} x{}, {}(x2)", c.rs2.into_u32(), c.imm),
            CBeqz(c) | CBnez(c) => write!(f, "{mnemonic} x{}, .{:+}", c.rs1.into_u32(), c.imm.value()),
            Fence | FenceI | Ecall | Ebreak | Uret | Sret | Hret | Mret | Wfi => write!(f, "{mnemonic}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::formats::RFormat;
    use crate::immediate::Immediate;
    use crate::regindex::X0;

    fn rv32i() -> Variant {
        Variant::parse("RV32I").unwrap()
    }

    fn rv32imac() -> Variant {
        Variant::parse("RV32IMAC").unwrap()
    }

    #[test]
    fn zero_word_decodes_to_addi_x0_x0_0_a_nop() {
        let insn = Instruction::decode(0x0000_0013, &rv32i()).unwrap();
        assert_eq!(insn.mnemonic(), "addi");
        if let Instruction::Addi(f) = insn {
            assert_eq!(f.rd, X0);
            assert_eq!(f.rs1, X0);
            assert_eq!(f.imm.value(), 0);
        } else {
            panic!("expected Addi");
        }
    }

    #[test]
    fn round_trips_add() {
        let f = RFormat { rd: crate::regindex::X1, rs1: crate::regindex::X2, rs2: crate::regindex::X3 };
        let insn = Instruction::Add(f);
        let word = insn.encode();
        assert_eq!(Instruction::decode(word, &rv32i()).unwrap(), insn);
    }

    #[test]
    fn mul_requires_m_extension() {
        let f = RFormat { rd: crate::regindex::X1, rs1: crate::regindex::X2, rs2: crate::regindex::X3 };
        let word = Instruction::Mul(f).encode();
        assert!(matches!(Instruction::decode(word, &rv32i()), Err(DecodeError::ExtensionNotEnabled("M"))));
        assert!(Instruction::decode(word, &rv32imac()).is_ok());
    }

    #[test]
    fn display_renders_operands_in_assembler_syntax() {
        let f = RFormat { rd: crate::regindex::X1, rs1: crate::regindex::X2, rs2: crate::regindex::X3 };
        assert_eq!(Instruction::Add(f).to_string(), "add x1, x2, x3");

        let mut imm = Immediate::new(12, true, false);
        imm.set(-4).unwrap();
        let jalr = Instruction::Jalr(IFormat { rd: X0, rs1: crate::regindex::X1, imm });
        assert_eq!(jalr.to_string(), "jalr x0, x1, -4");
    }

    #[test]
    fn display_resolves_known_csr_name() {
        let mut imm = Immediate::new(12, false, false);
        imm.set(0x300).unwrap();
        let csrrw = Instruction::Csrrw(IFormat { rd: X0, rs1: crate::regindex::X1, imm });
        assert_eq!(csrrw.to_string(), "csrrw x0, mstatus, x1");
    }

    #[test]
    fn display_renders_addi_x0_x0_zero_as_nop() {
        let imm = Immediate::new(12, true, false);
        let insn = Instruction::Addi(IFormat { rd: X0, rs1: X0, imm });
        assert_eq!(insn.to_string(), "nop");
    }

    #[test]
    fn srai_distinguished_from_srli_by_funct7() {
        let f = crate::formats::ShiftFormat { rd: crate::regindex::X1, rs1: crate::regindex::X2, shamt: 3 };
        let srli = Instruction::Srli(f).encode();
        let srai = Instruction::Srai(f).encode();
        assert_ne!(srli, srai);
        assert_eq!(Instruction::decode(srli, &rv32i()).unwrap().mnemonic(), "srli");
        assert_eq!(Instruction::decode(srai, &rv32i()).unwrap().mnemonic(), "srai");
    }

    #[test]
    fn random_produces_the_requested_mnemonic() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let insn = Instruction::random("add", &rv32i(), &mut rng).unwrap();
        assert_eq!(insn.mnemonic(), "add");
    }

    #[test]
    fn random_unknown_mnemonic_returns_none() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        assert!(Instruction::random("frobnicate", &rv32i(), &mut rng).is_none());
    }

    #[test]
    fn random_rv64_only_mnemonic_uses_full_shift_width() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let rv64 = Variant::parse("RV64I").unwrap();
        for _ in 0..50 {
            if let Instruction::Slli(f) = Instruction::random("slli", &rv64, &mut rng).unwrap() {
                assert!(f.shamt < 64);
            }
        }
    }
}
