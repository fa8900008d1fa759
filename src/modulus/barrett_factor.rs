//! The Barrett factor: a precomputed pair `(operand, factor)` with
//! `factor = floor((operand << S) / q)`, shared by value wherever a
//! lazy modular multiplication needs to avoid a division.

use crate::error::{KernelError, Result};
use crate::integer::divide_u128_u64_lo;

/// Supported Barrett shifts. `S32` backs the legacy/compatibility path,
/// `S52` the AVX-512 IFMA path, `S64` the default 64-bit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    S32,
    S52,
    S64,
}

impl Shift {
    fn bits(self) -> u32 {
        match self {
            Shift::S32 => 32,
            Shift::S52 => 52,
            Shift::S64 => 64,
        }
    }

    fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Shift::S32),
            52 => Ok(Shift::S52),
            64 => Ok(Shift::S64),
            other => Err(KernelError::InvalidArguments(format!(
                "unsupported Barrett shift {other}, expected one of {{32, 52, 64}}"
            ))),
        }
    }
}

/// An immutable `(operand, factor)` pair where
/// `factor = floor((operand * 2^S) / q)` for one of `S ∈ {32, 52, 64}`.
///
/// Constructed once per `(operand, S, q)` and read-only thereafter;
/// there is no ownership graph to manage, so this is a plain `Copy` value
/// type rather than a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplyFactor {
    operand: u64,
    shift: Shift,
    factor: u64,
}

impl MultiplyFactor {
    /// Builds the Barrett factor for `operand` at shift `shift_bits`
    /// (one of `32, 52, 64`) modulo `q`. Requires `operand <= q`.
    pub fn new(operand: u64, shift_bits: u32, q: u64) -> Result<Self> {
        if operand > q {
            return Err(KernelError::InvalidArguments(format!(
                "operand {operand} exceeds modulus {q}"
            )));
        }
        let shift = Shift::from_bits(shift_bits)?;
        let s = shift.bits();

        let (hi, lo) = if s == 64 {
            (operand, 0)
        } else {
            (operand >> (64 - s), operand << s)
        };

        let factor = divide_u128_u64_lo(hi, lo, q);
        Ok(Self {
            operand,
            shift,
            factor,
        })
    }

    #[inline(always)]
    pub fn operand(&self) -> u64 {
        self.operand
    }

    #[inline(always)]
    pub fn shift(&self) -> Shift {
        self.shift
    }

    #[inline(always)]
    pub fn barrett_factor(&self) -> u64 {
        self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_matches_definition() {
        let q = 0xFFFF_EE00_1u64;
        for &(operand, bits) in &[(q - 1, 32u32), (q - 1, 52), (q - 1, 64), (1u64, 64)] {
            let mf = MultiplyFactor::new(operand, bits, q).unwrap();
            let expected = ((operand as u128) << bits) / (q as u128);
            assert_eq!(mf.barrett_factor() as u128, expected);
        }
    }

    #[test]
    fn rejects_unsupported_shift() {
        let err = MultiplyFactor::new(1, 48, 17).unwrap_err();
        assert!(matches!(err, KernelError::InvalidArguments(_)));
    }

    #[test]
    fn rejects_operand_larger_than_modulus() {
        let err = MultiplyFactor::new(20, 64, 17).unwrap_err();
        assert!(matches!(err, KernelError::InvalidArguments(_)));
    }
}
