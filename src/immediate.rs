//! Fixed-width immediates with optional LSB-0 alignment (§3, §4.2).

use std::fmt;

use rand::Rng;

use crate::bits::sign_extend;
use crate::error::ImmediateError;

/// A constant encoded in an instruction word. Construction fixes `bits`/`signed`/`lsb0`;
/// the value itself can only change through [`Immediate::set`], [`Immediate::set_from_bits`]
/// or [`Immediate::randomize`] — there is no public field to assign directly, which is how
/// this crate enforces the "no direct reassignment" invariant the Python original policed
/// at runtime with `__setattr__`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Immediate {
    bits: u32,
    signed: bool,
    lsb0: bool,
    value: i64,
}

impl Immediate {
    /// A zero-valued immediate with the given shape.
    pub const fn new(bits: u32, signed: bool, lsb0: bool) -> Self {
        Self { bits, signed, lsb0, value: 0 }
    }

    pub const fn bits(&self) -> u32 {
        self.bits
    }

    pub const fn signed(&self) -> bool {
        self.signed
    }

    pub const fn lsb0(&self) -> bool {
        self.lsb0
    }

    pub const fn max(&self) -> i64 {
        if self.signed {
            (1i64 << (self.bits - 1)) - 1
        } else {
            if self.bits >= 64 {
                i64::MAX
            } else {
                (1i64 << self.bits) - 1
            }
        }
    }

    pub const fn min(&self) -> i64 {
        if self.signed {
            -(1i64 << (self.bits - 1))
        } else {
            0
        }
    }

    pub const fn value(&self) -> i64 {
        self.value
    }

    /// The value reinterpreted as the unsigned bit pattern an encoder packs into a word.
    pub const fn unsigned(&self) -> u64 {
        if self.bits >= 64 {
            self.value as u64
        } else {
            (self.value as u64) & ((1u64 << self.bits) - 1)
        }
    }

    /// Range-checked assignment (§4.2 `set`).
    pub fn set(&mut self, value: i64) -> Result<(), ImmediateError> {
        if self.lsb0 && value % 2 != 0 {
            return Err(ImmediateError::NotEven(value));
        }
        if value < self.min() || value > self.max() {
            return Err(ImmediateError::OutOfRange {
                value,
                min: self.min(),
                max: self.max(),
                bits: self.bits,
                signed: self.signed,
            });
        }
        self.value = value;
        Ok(())
    }

    /// Loads a raw (unsigned) bit pattern extracted from a machine word, sign-extending
    /// when `signed` (§4.2 `set_from_bits`).
    pub fn set_from_bits(&mut self, raw: u64) -> Result<(), ImmediateError> {
        let value = if self.signed { sign_extend(raw, self.bits) } else { raw as i64 };
        self.set(value)
    }

    /// Uniformly samples a value in `[min, max]`, clearing the low bit when `lsb0`.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let mut value = rng.gen_range(self.min()..=self.max());
        if self.lsb0 {
            value -= value % 2;
        }
        self.value = value;
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn twelve_bit_signed_range() {
        let imm = Immediate::new(12, true, false);
        assert_eq!(imm.min(), -2048);
        assert_eq!(imm.max(), 2047);
    }

    #[test]
    fn set_rejects_out_of_range() {
        let mut imm = Immediate::new(12, true, false);
        assert!(imm.set(2048).is_err());
        assert!(imm.set(-2049).is_err());
        assert!(imm.set(2047).is_ok());
    }

    #[test]
    fn lsb0_rejects_odd_values() {
        let mut imm = Immediate::new(13, true, true);
        assert!(matches!(imm.set(3), Err(ImmediateError::NotEven(3))));
        assert!(imm.set(4).is_ok());
    }

    #[test]
    fn set_from_bits_sign_extends() {
        let mut imm = Immediate::new(12, true, false);
        imm.set_from_bits(0xFFF).unwrap();
        assert_eq!(imm.value(), -1);
        imm.set_from_bits(0x7FF).unwrap();
        assert_eq!(imm.value(), 2047);
    }

    #[test]
    fn immediate_law_round_trips_every_value_in_range() {
        let mut imm = Immediate::new(12, true, false);
        for x in imm.min()..=imm.max() {
            imm.set(x).unwrap();
            let bits = imm.unsigned();
            imm.set_from_bits(bits).unwrap();
            assert_eq!(imm.value(), x);
        }
    }

    #[test]
    fn randomize_respects_lsb0_and_range() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut imm = Immediate::new(13, true, true);
        for _ in 0..100 {
            imm.randomize(&mut rng);
            assert_eq!(imm.value() % 2, 0);
            assert!(imm.value() >= imm.min() && imm.value() <= imm.max());
        }
    }
}
