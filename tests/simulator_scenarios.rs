//! End-to-end `Model`/`Simulator` scenarios driven by hand-encoded machine words (§8 concrete
//! scenarios 1, 4, 5 and 6): register chains, load-reserved/store-conditional, shift-immediate
//! sign extension and a sub-word store merging into a preloaded word.

use riscvmodel::instruction::Instruction;
use riscvmodel::model::Model;
use riscvmodel::registers::Register;
use riscvmodel::variant::Variant;

fn rv32i() -> Variant {
    Variant::parse("RV32I").unwrap()
}

fn issue(model: &mut Model, word: u32) {
    let variant = model.state.variant.clone();
    let insn = Instruction::decode(word, &variant).unwrap();
    model.issue(&insn).unwrap();
}

#[test]
fn addi_chain_accumulates_then_subtracts_past_zero() {
    // addi x1, x0, 1 ; addi x1, x1, 1 ; addi x2, x1, -2
    let mut model = Model::new(rv32i());
    issue(&mut model, 0x0000_0093);
    issue(&mut model, 0x0010_8093);
    issue(&mut model, 0xFFE0_8113);

    assert_eq!(model.state.regfile.read(1).unsigned(), 2);
    assert_eq!(model.state.regfile.read(2).signed(), 0);
}

#[test]
fn lui_then_srai_sign_extends_the_shifted_result() {
    // lui x1, 0xFEBED ; srai x2, x1, 12
    let mut model = Model::new(rv32i());
    issue(&mut model, 0xFEBE_D0B7);
    issue(&mut model, 0x40C0_D113);

    assert_eq!(model.state.regfile.read(2).unsigned() as u32, 0xFFFF_EBED);
}

#[test]
fn load_reserved_store_conditional_succeeds_once_then_fails() {
    let variant = Variant::parse("RV32IA").unwrap();
    let mut model = Model::new(variant.clone());
    model.state.regfile.write(1, Register::from_signed(32, 0x1000));
    model.state.regfile.write(4, Register::from_signed(32, 7));
    model.state.regfile.write(5, Register::from_signed(32, 8));
    model.state.commit();

    // lr.w x2, (x1), aq=1 so the reservation is actually taken
    issue(&mut model, (0b00010 << 27) | (1 << 26) | (1 << 15) | (0b010 << 12) | (2 << 7) | 0x2F);
    // sc.w x3, x4, (x1) -- first reservation still live, must succeed
    issue(&mut model, (0b00011 << 27) | (4 << 20) | (1 << 15) | (0b010 << 12) | (3 << 7) | 0x2F);
    // sc.w x3, x5, (x1) -- reservation already consumed, must fail
    issue(&mut model, (0b00011 << 27) | (5 << 20) | (1 << 15) | (0b010 << 12) | (3 << 7) | 0x2F);

    assert_eq!(model.state.regfile.read(2).unsigned(), 7);
    assert_eq!(model.state.regfile.read(3).unsigned(), 1, "second sc.w must report failure");

    let _ = variant;
}

#[test]
fn byte_store_merges_into_a_preloaded_word_without_disturbing_its_other_lanes() {
    let mut model = Model::new(rv32i());
    model.state.memory_mut().preload_word(0x40 >> 2, 0x1122_3344);
    model.state.regfile.write(10, Register::from_signed(32, 0x41));
    model.state.regfile.write(11, Register::from_signed(32, 0xAA));
    model.state.commit();

    // sb x11, 0(x10)
    issue(&mut model, (11 << 20) | (10 << 15) | (0b000 << 12) | 0x23);

    assert_eq!(model.state.lw(0x40), 0x1122_AA44);
}
