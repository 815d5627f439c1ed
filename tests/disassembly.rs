//! Assembler-syntax rendering for hand-built machine words (§6 "Assembly output syntax",
//! concrete scenarios 2 and 3).

use riscvmodel::instruction::Instruction;
use riscvmodel::variant::Variant;

fn rv32i() -> Variant {
    Variant::parse("RV32I").unwrap()
}

#[test]
fn decoding_0x00000013_yields_the_canonical_nop() {
    let insn = Instruction::decode(0x0000_0013, &rv32i()).unwrap();
    assert_eq!(insn.to_string(), "nop");
}

#[test]
fn lui_boundaries_disassemble_with_the_full_shifted_immediate() {
    let variant = rv32i();
    let cases: &[(u32, &str)] = &[
        (0x0000_00B7, "lui x1, 0"),
        (0x0000_1137, "lui x2, 4096"),
        (0x8000_01B7, "lui x3, -2147483648"),
        (0xFFFF_F237, "lui x4, -4096"),
    ];
    for &(word, expected) in cases {
        let insn = Instruction::decode(word, &variant).unwrap();
        assert_eq!(insn.to_string(), expected, "word {word:#010x}");
    }
}

#[test]
fn addi_disassembles_as_three_operand_arithmetic() {
    let insn = Instruction::decode(0x0010_8093, &rv32i()).unwrap();
    assert_eq!(insn.to_string(), "addi x1, x1, 1");
}

#[test]
fn srai_disassembles_shamt_as_two_hex_digits() {
    let insn = Instruction::decode(0x40C0_D113, &rv32i()).unwrap();
    assert_eq!(insn.to_string(), "srai x2, x1, 0x0c");
}

#[test]
fn csrrw_disassembles_with_the_architectural_csr_name() {
    let variant = Variant::parse("RV32IZicsr").unwrap();
    // csrrw x1, mstatus, x2: csr=0x300, rs1=x2, rd=x1.
    let word = (0x300u32 << 20) | (2 << 15) | (0b001 << 12) | (1 << 7) | 0x73;
    let insn = Instruction::decode(word, &variant).unwrap();
    assert_eq!(insn.to_string(), "csrrw x1, mstatus, x2");
}
