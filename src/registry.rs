//! The mnemonic registry: reverse lookup by mnemonic and enumeration by variant (§4.4).
//!
//! The source's registry walks a class hierarchy at runtime, asking each class for its
//! declared variant. [`Instruction`](crate::instruction::Instruction) has no hierarchy to
//! walk, so this module keeps the same information as a flat, declaration-ordered table and
//! answers both queries against it directly.

use std::sync::OnceLock;

use crate::instruction::Format;
use crate::variant::Variant;

/// What a mnemonic needs from a [`Variant`] to be eligible for decode/encode.
///
/// `xlen` is tracked on `Variant` as a plain field rather than a member of its extension set,
/// so an RV64-only mnemonic (`ld`, `addiw`, ...) cannot be gated with `has_extension` the way
/// `M`/`A`/`Zicsr`/`Zifencei` mnemonics are; this variant exists to say so explicitly instead
/// of inventing a fictitious `"RV64I"` extension string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Available on every base variant (RV32I and above).
    Base,
    /// Needs `variant.has_extension(_)` to hold for the given name.
    Extension(&'static str),
    /// Needs `variant.xlen() == 64`.
    Xlen64,
}

impl Requirement {
    fn is_met_by(self, variant: &Variant) -> bool {
        match self {
            Requirement::Base => true,
            Requirement::Extension(ext) => variant.has_extension(ext),
            Requirement::Xlen64 => variant.xlen() == 64,
        }
    }
}

/// A single registry entry: everything [`reverse_lookup`] and [`get_insns`] need about one
/// mnemonic, independent of any particular decoded operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub mnemonic: &'static str,
    pub format: Format,
    pub requirement: Requirement,
}

macro_rules! descriptors {
    ($(($mnemonic:literal, $format:expr, $requirement:expr)),+ $(,)?) => {
        &[$(Descriptor { mnemonic: $mnemonic, format: $format, requirement: $requirement }),+]
    };
}

fn table() -> &'static [Descriptor] {
    static TABLE: OnceLock<Vec<Descriptor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use Format::*;
        use Requirement::*;
        descriptors![
            ("lui", U, Base),
            ("auipc", U, Base),
            ("jal", J, Base),
            ("jalr", I, Base),
            ("beq", B, Base),
            ("bne", B, Base),
            ("blt", B, Base),
            ("bge", B, Base),
            ("bltu", B, Base),
            ("bgeu", B, Base),
            ("lb", IL, Base),
            ("lh", IL, Base),
            ("lw", IL, Base),
            ("lbu", IL, Base),
            ("lhu", IL, Base),
            ("lwu", IL, Xlen64),
            ("ld", IL, Xlen64),
            ("sb", S, Base),
            ("sh", S, Base),
            ("sw", S, Base),
            ("sd", S, Xlen64),
            ("addi", I, Base),
            ("slti", I, Base),
            ("sltiu", I, Base),
            ("xori", I, Base),
            ("ori", I, Base),
            ("andi", I, Base),
            ("slli", IS, Base),
            ("srli", IS, Base),
            ("srai", IS, Base),
            ("addiw", I, Xlen64),
            ("slliw", IS, Xlen64),
            ("srliw", IS, Xlen64),
            ("sraiw", IS, Xlen64),
            ("add", R, Base),
            ("sub", R, Base),
            ("sll", R, Base),
            ("slt", R, Base),
            ("sltu", R, Base),
            ("xor", R, Base),
            ("srl", R, Base),
            ("sra", R, Base),
            ("or", R, Base),
            ("and", R, Base),
            ("addw", R, Xlen64),
            ("subw", R, Xlen64),
            ("sllw", R, Xlen64),
            ("srlw", R, Xlen64),
            ("sraw", R, Xlen64),
            ("mul", R, Extension("M")),
            ("mulh", R, Extension("M")),
            ("mulhsu", R, Extension("M")),
            ("mulhu", R, Extension("M")),
            ("div", R, Extension("M")),
            ("divu", R, Extension("M")),
            ("rem", R, Extension("M")),
            ("remu", R, Extension("M")),
            ("mulw", R, Extension("M")),
            ("divw", R, Extension("M")),
            ("divuw", R, Extension("M")),
            ("remw", R, Extension("M")),
            ("remuw", R, Extension("M")),
            ("lr.w", Amo, Extension("A")),
            ("sc.w", Amo, Extension("A")),
            ("amoswap.w", Amo, Extension("A")),
            ("amoadd.w", Amo, Extension("A")),
            ("amoxor.w", Amo, Extension("A")),
            ("amoand.w", Amo, Extension("A")),
            ("amoor.w", Amo, Extension("A")),
            ("amomin.w", Amo, Extension("A")),
            ("amomax.w", Amo, Extension("A")),
            ("amominu.w", Amo, Extension("A")),
            ("amomaxu.w", Amo, Extension("A")),
            ("csrrw", I, Extension("Zicsr")),
            ("csrrs", I, Extension("Zicsr")),
            ("csrrc", I, Extension("Zicsr")),
            ("csrrwi", I, Extension("Zicsr")),
            ("csrrsi", I, Extension("Zicsr")),
            ("csrrci", I, Extension("Zicsr")),
            ("c.addi", CI, Extension("C")),
            ("c.andi", CI, Extension("C")),
            ("c.li", CI, Extension("C")),
            ("c.mv", CR, Extension("C")),
            ("c.swsp", CSS, Extension("C")),
            ("c.beqz", CB, Extension("C")),
            ("c.bnez", CB, Extension("C")),
            ("fence", I, Base),
            ("fence.i", I, Extension("Zifencei")),
            ("ecall", I, Base),
            ("ebreak", I, Base),
            ("uret", I, Base),
            ("sret", I, Base),
            ("hret", I, Base),
            ("mret", I, Base),
            ("wfi", I, Base),
        ]
        .to_vec()
    })
}

/// Looks up the registry entry for `mnemonic` (e.g. `"addi"`), independent of any variant.
pub fn reverse_lookup(mnemonic: &str) -> Option<&'static Descriptor> {
    table().iter().find(|d| d.mnemonic == mnemonic)
}

/// Every mnemonic eligible under `variant`, in declaration order.
///
/// `get_insns(a)` is a subset of `get_insns(b)` whenever `a.is_subset_of(b)` (§8): `is_subset_of`
/// requires equal `xlen`, so [`Requirement::Xlen64`] entries are included or excluded
/// identically for `a` and `b`, and [`Requirement::Extension`] entries follow directly from
/// `a`'s extensions being a subset of `b`'s.
pub fn get_insns(variant: &Variant) -> Vec<&'static Descriptor> {
    table().iter().filter(|d| d.requirement.is_met_by(variant)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Variant;

    fn rv32i() -> Variant {
        Variant::parse("RV32I").unwrap()
    }

    fn rv32im() -> Variant {
        Variant::parse("RV32IM").unwrap()
    }

    fn rv64i() -> Variant {
        Variant::parse("RV64I").unwrap()
    }

    #[test]
    fn reverse_lookup_finds_known_mnemonic() {
        let d = reverse_lookup("addi").expect("addi must be registered");
        assert_eq!(d.format, Format::I);
        assert_eq!(d.requirement, Requirement::Base);
    }

    #[test]
    fn reverse_lookup_rejects_unknown_mnemonic() {
        assert!(reverse_lookup("frobnicate").is_none());
    }

    #[test]
    fn get_insns_excludes_ungated_extension() {
        let insns = get_insns(&rv32i());
        assert!(!insns.iter().any(|d| d.mnemonic == "mul"));
        assert!(insns.iter().any(|d| d.mnemonic == "addi"));
    }

    #[test]
    fn get_insns_excludes_rv64_only_mnemonics_on_rv32() {
        let insns = get_insns(&rv32i());
        assert!(!insns.iter().any(|d| d.mnemonic == "ld"));
        assert!(!insns.iter().any(|d| d.mnemonic == "addiw"));
    }

    #[test]
    fn get_insns_includes_rv64_only_mnemonics_on_rv64() {
        let insns = get_insns(&rv64i());
        assert!(insns.iter().any(|d| d.mnemonic == "ld"));
        assert!(insns.iter().any(|d| d.mnemonic == "addiw"));
    }

    #[test]
    fn get_insns_has_no_duplicate_mnemonics() {
        let insns = get_insns(&rv32im());
        let mut mnemonics: Vec<&str> = insns.iter().map(|d| d.mnemonic).collect();
        let before = mnemonics.len();
        mnemonics.sort_unstable();
        mnemonics.dedup();
        assert_eq!(mnemonics.len(), before);
    }

    #[test]
    fn get_insns_is_monotone_in_variant_subset() {
        let a = rv32i();
        let b = rv32im();
        assert!(a.is_subset_of(&b));
        let insns_a: Vec<&str> = get_insns(&a).iter().map(|d| d.mnemonic).collect();
        let insns_b: Vec<&str> = get_insns(&b).iter().map(|d| d.mnemonic).collect();
        assert!(insns_a.iter().all(|m| insns_b.contains(m)));
        assert!(insns_b.len() > insns_a.len());
    }

    #[test]
    fn get_insns_is_stable_declaration_order() {
        let insns = get_insns(&rv32i());
        let lui = insns.iter().position(|d| d.mnemonic == "lui").unwrap();
        let jalr = insns.iter().position(|d| d.mnemonic == "jalr").unwrap();
        assert!(lui < jalr);
    }
}
