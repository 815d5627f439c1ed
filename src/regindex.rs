//! The 5-bit register *index* an instruction word encodes in its `rd`/`rs1`/`rs2` fields.
//!
//! Not to be confused with [`crate::registers::Register`], the wide integer *value* a
//! register holds at runtime — this type only ever ranges `0..32` (or `0..16` under the
//! embedded `E` base, checked by the instruction registry rather than this type).

use core::fmt;
use std::{
    error::Error,
    fmt::{Debug, Display, Write},
};

use crate::util::{u16_fits_n_bits, u32_fits_n_bits, u64_fits_n_bits, u8_fits_n_bits, usize_fits_n_bits};

/// Number of integer registers under the full `I` base.
pub const NUMBER_OF_REGISTERS: usize = 32;

/// Hard-wired zero, ignores writes
pub const X0: RegIndex = RegIndex(0);
pub const X1: RegIndex = RegIndex(1);
pub const X2: RegIndex = RegIndex(2);
pub const X3: RegIndex = RegIndex(3);
pub const X4: RegIndex = RegIndex(4);
pub const X5: RegIndex = RegIndex(5);
pub const X6: RegIndex = RegIndex(6);
pub const X7: RegIndex = RegIndex(7);
pub const X8: RegIndex = RegIndex(8);
pub const X9: RegIndex = RegIndex(9);
pub const X10: RegIndex = RegIndex(10);
pub const X11: RegIndex = RegIndex(11);
pub const X12: RegIndex = RegIndex(12);
pub const X13: RegIndex = RegIndex(13);
pub const X14: RegIndex = RegIndex(14);
pub const X15: RegIndex = RegIndex(15);
pub const X16: RegIndex = RegIndex(16);
pub const X17: RegIndex = RegIndex(17);
pub const X18: RegIndex = RegIndex(18);
pub const X19: RegIndex = RegIndex(19);
pub const X20: RegIndex = RegIndex(20);
pub const X21: RegIndex = RegIndex(21);
pub const X22: RegIndex = RegIndex(22);
pub const X23: RegIndex = RegIndex(23);
pub const X24: RegIndex = RegIndex(24);
pub const X25: RegIndex = RegIndex(25);
pub const X26: RegIndex = RegIndex(26);
pub const X27: RegIndex = RegIndex(27);
pub const X28: RegIndex = RegIndex(28);
pub const X29: RegIndex = RegIndex(29);
pub const X30: RegIndex = RegIndex(30);
pub const X31: RegIndex = RegIndex(31);

/// A register index as it appears packed into an instruction word.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct RegIndex(u8);

impl RegIndex {
    const NBITS: usize = 5;

    pub(crate) const fn into_u32(self) -> u32 {
        self.0 as u32
    }
}

impl Display for RegIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('x')?;
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<u8> for RegIndex {
    type Error = RegIndexConvError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if u8_fits_n_bits(value, Self::NBITS) {
            Ok(Self(value))
        } else {
            Err(RegIndexConvError::U8(value))
        }
    }
}

impl TryFrom<u16> for RegIndex {
    type Error = RegIndexConvError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if u16_fits_n_bits(value, Self::NBITS) {
            Ok(Self(value as u8))
        } else {
            Err(RegIndexConvError::U16(value))
        }
    }
}

impl TryFrom<u32> for RegIndex {
    type Error = RegIndexConvError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if u32_fits_n_bits(value, Self::NBITS) {
            Ok(Self(value as u8))
        } else {
            Err(RegIndexConvError::U32(value))
        }
    }
}

impl TryFrom<u64> for RegIndex {
    type Error = RegIndexConvError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if u64_fits_n_bits(value, Self::NBITS) {
            Ok(Self(value as u8))
        } else {
            Err(RegIndexConvError::U64(value))
        }
    }
}

impl TryFrom<usize> for RegIndex {
    type Error = RegIndexConvError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if usize_fits_n_bits(value, Self::NBITS) {
            Ok(Self(value as u8))
        } else {
            Err(RegIndexConvError::Usize(value))
        }
    }
}

impl TryFrom<i32> for RegIndex {
    type Error = RegIndexConvError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (0..NUMBER_OF_REGISTERS as i32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RegIndexConvError::I32(value))
        }
    }
}

impl From<RegIndex> for u8 {
    fn from(r: RegIndex) -> Self {
        r.0
    }
}

impl From<RegIndex> for u32 {
    fn from(r: RegIndex) -> Self {
        From::from(r.0)
    }
}

impl From<RegIndex> for usize {
    fn from(value: RegIndex) -> Self {
        usize::from(value.0)
    }
}

/// `RegIndex` conversion error: the source value was outside `0..32`.
#[derive(Debug)]
pub enum RegIndexConvError {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I32(i32),
}

impl Display for RegIndexConvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegIndexConvError::U8(value) => write!(f, "invalid register index: {value}"),
            RegIndexConvError::U16(value) => write!(f, "invalid register index: {value}"),
            RegIndexConvError::U32(value) => write!(f, "invalid register index: {value}"),
            RegIndexConvError::U64(value) => write!(f, "invalid register index: {value}"),
            RegIndexConvError::Usize(value) => write!(f, "invalid register index: {value}"),
            RegIndexConvError::I32(value) => write!(f, "invalid register index: {value}"),
        }
    }
}

impl Error for RegIndexConvError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_u32() {
        assert_eq!(X22.into_u32(), 22);
    }

    #[test]
    fn register_display() -> Result<(), RegIndexConvError> {
        for i in 0..NUMBER_OF_REGISTERS {
            assert_eq!(RegIndex::try_from(i)?.to_string(), format!("x{i}"));
        }
        Ok(())
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(RegIndex::try_from(32u8), Err(RegIndexConvError::U8(32))));
        assert!(matches!(RegIndex::try_from(-1i32), Err(RegIndexConvError::I32(-1))));
        assert!(matches!(RegIndex::try_from(32i32), Err(RegIndexConvError::I32(32))));
    }

    #[test]
    fn conversions_roundtrip() -> Result<(), RegIndexConvError> {
        assert_eq!(u8::from(RegIndex::try_from(31u8)?), 31);
        assert_eq!(u32::from(RegIndex::try_from(31u32)?), 31);
        assert_eq!(usize::from(RegIndex::try_from(31usize)?), 31);
        Ok(())
    }
}
