//! Trace-faithfulness of the golden bridge against an externally driven fetch/commit
//! protocol (§8 "golden-model equivalence", §4.7), built entirely from decoded machine words.

use riscvmodel::golden::{traces_from_rvfi, GoldenFault, GoldenUnbuffered, RvfiSignals};
use riscvmodel::instruction::Instruction;
use riscvmodel::model::Model;
use riscvmodel::state::Trace;
use riscvmodel::variant::Variant;

fn rv32i() -> Variant {
    Variant::parse("RV32I").unwrap()
}

fn decode_all(words: &[u32], variant: &Variant) -> Vec<Instruction> {
    words.iter().map(|&w| Instruction::decode(w, variant).unwrap()).collect()
}

#[test]
fn fetch_commit_accepts_a_reference_trace_that_matches_the_model() {
    let variant = rv32i();
    // addi x1, x0, 1 ; addi x1, x1, 1
    let program = decode_all(&[0x0000_0093, 0x0010_8093], &variant);
    let mut golden = GoldenUnbuffered::new(variant.clone(), program.clone(), 0);
    let mut reference = Model::new(variant);

    for (expected_pc, insn) in [(0, program[0]), (4, program[1])] {
        let fetched = golden.fetch(expected_pc).unwrap();
        assert_eq!(fetched, insn);
        let trace = reference.issue(&insn).unwrap();
        golden.commit(&trace, Some(&insn)).unwrap();
    }

    assert_eq!(reference.state.regfile.read(1).unsigned(), 2);
}

#[test]
fn commit_rejects_a_trace_claiming_a_register_value_the_model_did_not_produce() {
    let variant = rv32i();
    let program = decode_all(&[0x0000_0093], &variant);
    let mut golden = GoldenUnbuffered::new(variant, program.clone(), 0);

    golden.fetch(0).unwrap();
    let forged_signals = RvfiSignals { valid: true, insn: 0x0000_0093, rd_addr: 1, rd_wdata: 41 };
    let forged_trace = traces_from_rvfi(&forged_signals).unwrap();

    let err = golden.commit(&forged_trace, Some(&program[0])).unwrap_err();
    assert!(matches!(err, GoldenFault::Mismatch(_)));
}

#[test]
fn commit_rejects_an_unexpected_mnemonic() {
    let variant = rv32i();
    // addi x1, x0, 1 decoded, but the "observed" instruction is a different addi.
    let program = decode_all(&[0x0000_0093], &variant);
    let unexpected = Instruction::decode(0x0020_8093, &variant).unwrap(); // addi x1, x1, 2
    let mut golden = GoldenUnbuffered::new(variant, program, 0);

    golden.fetch(0).unwrap();
    let err = golden.commit(&[], Some(&unexpected)).unwrap_err();
    assert!(matches!(err, GoldenFault::Mismatch(_)));
}

#[test]
fn fetch_past_the_last_instruction_signals_program_end() {
    let variant = rv32i();
    let program = decode_all(&[0x0000_0093], &variant);
    let mut golden = GoldenUnbuffered::new(variant, program, 0);

    golden.fetch(0).unwrap();
    assert!(matches!(golden.fetch(4), Err(GoldenFault::End(_))));
}

#[test]
fn traces_from_rvfi_translates_a_valid_retire_record() {
    let signals = RvfiSignals { valid: true, insn: 0x0000_0093, rd_addr: 1, rd_wdata: 9 };
    let traces = traces_from_rvfi(&signals).unwrap();
    assert_eq!(traces.len(), 1);
    match traces[0] {
        Trace::IntReg(r) => {
            assert_eq!(r.index, 1);
            assert_eq!(r.value.unsigned(), 9);
        }
        other => panic!("expected an IntReg trace, got {other:?}"),
    }
}

#[test]
fn traces_from_rvfi_rejects_a_nonzero_write_to_x0() {
    let signals = RvfiSignals { valid: true, insn: 0x0000_0093, rd_addr: 0, rd_wdata: 9 };
    assert!(traces_from_rvfi(&signals).is_err());
}

#[test]
fn traces_from_rvfi_ignores_an_invalid_retire_cycle() {
    let signals = RvfiSignals { valid: false, insn: 0, rd_addr: 0, rd_wdata: 0 };
    assert_eq!(traces_from_rvfi(&signals).unwrap(), Vec::new());
}
