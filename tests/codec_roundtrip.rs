//! Round-trip codec and variant-subset properties (decode/encode are the inverse of each
//! other on every well-formed instruction the registry can produce).

use quickcheck_macros::quickcheck;
use rand::rngs::StdRng;
use rand::SeedableRng;
use riscvmodel::instruction::Instruction;
use riscvmodel::registry::get_insns;
use riscvmodel::variant::Variant;

fn rv64gc() -> Variant {
    Variant::parse("RV64GC").unwrap()
}

#[test]
fn every_mnemonic_in_the_registry_round_trips_under_rv64gc() {
    let variant = rv64gc();
    let mut rng = StdRng::seed_from_u64(1);
    for descriptor in get_insns(&variant) {
        for _ in 0..20 {
            let Some(insn) = Instruction::random(descriptor.mnemonic, &variant, &mut rng) else {
                panic!("registry advertises {} but random() doesn't know it", descriptor.mnemonic);
            };
            let word = insn.encode();
            let decoded = Instruction::decode(word, &variant);
            assert_eq!(decoded.unwrap(), insn, "round-trip broke for {}", descriptor.mnemonic);
        }
    }
}

#[quickcheck]
fn addi_round_trips_for_every_seed(seed: u64) -> bool {
    let variant = Variant::parse("RV32I").unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let insn = Instruction::random("addi", &variant, &mut rng).unwrap();
    Instruction::decode(insn.encode(), &variant).unwrap() == insn
}

#[test]
fn rv32i_is_a_strict_subset_of_rv32im() {
    let base = Variant::parse("RV32I").unwrap();
    let with_mul = Variant::parse("RV32IM").unwrap();
    assert!(base.is_subset_of(&with_mul));

    let base_mnemonics: Vec<&str> = get_insns(&base).iter().map(|d| d.mnemonic).collect();
    let extended_mnemonics: Vec<&str> = get_insns(&with_mul).iter().map(|d| d.mnemonic).collect();
    assert!(base_mnemonics.iter().all(|m| extended_mnemonics.contains(m)));
    assert!(extended_mnemonics.contains(&"mul"));
    assert!(!base_mnemonics.contains(&"mul"));
}

#[test]
fn decoding_an_unrecognized_opcode_fails() {
    let variant = Variant::parse("RV32I").unwrap();
    // funct3/opcode combination with no registered mnemonic.
    assert!(Instruction::decode(0b1111111_00000_00000_111_00000_1111111, &variant).is_err());
}

#[test]
fn decoding_an_extension_gated_instruction_without_the_extension_fails() {
    let rv32i = Variant::parse("RV32I").unwrap();
    let rv32im = Variant::parse("RV32IM").unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let mul = Instruction::random("mul", &rv32im, &mut rng).unwrap();
    assert!(Instruction::decode(mul.encode(), &rv32i).is_err());
    assert!(Instruction::decode(mul.encode(), &rv32im).is_ok());
}
