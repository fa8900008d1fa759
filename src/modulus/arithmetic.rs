//! Modular arithmetic over `Z/qZ` for `q < 2^62`.
//!
//! All "hot path" functions here (`add_mod`, `sub_mod`, `mul_mod_lazy`,
//! `reduce_mod`, `barrett_reduce64`) take pre-reduced operands and guard
//! their preconditions with `debug_assert!` rather than returning
//! `Result`: they sit inside the NTT butterfly and `eltwise_fma_mod` inner
//! loops, called millions of times per transform, and are only ever
//! invoked by this crate's own code with operands it has already
//! validated. Functions reachable directly from a public API boundary
//! (`pow_mod`, `inv_mod`) return `Result` instead.

use crate::error::{KernelError, Result};
use crate::integer::mul_hi_u64;

/// Returns `(x + y) mod q`. Requires `x, y < q`; since `q < 2^62` the sum
/// never overflows `u64`.
#[inline(always)]
pub fn add_mod(x: u64, y: u64, q: u64) -> u64 {
    debug_assert!(x < q && y < q, "add_mod operands must be reduced mod q");
    let sum = x + y;
    if sum >= q {
        sum - q
    } else {
        sum
    }
}

/// Returns `(x - y) mod q`. Requires `x, y < q`.
#[inline(always)]
pub fn sub_mod(x: u64, y: u64, q: u64) -> u64 {
    debug_assert!(x < q && y < q, "sub_mod operands must be reduced mod q");
    if x >= y {
        x - y
    } else {
        x + q - y
    }
}

/// Returns `x mod q` given `q_barr = floor(2^64 / q)`, for any `x`. The
/// quotient estimate from a single high-multiply is off by at most one,
/// so a single conditional subtract suffices to land in `[0, q)`.
#[inline(always)]
pub fn barrett_reduce64(x: u64, q: u64, q_barr: u64) -> u64 {
    let quotient_estimate = mul_hi_u64::<64>(x, q_barr);
    let reduced = x.wrapping_sub(quotient_estimate.wrapping_mul(q));
    if reduced >= q {
        reduced - q
    } else {
        reduced
    }
}

/// Reduces `x` modulo `q`, assuming `x < K * q`, via `0..=3` chained
/// conditional subtracts depending on `K`.
///
/// `K` must be one of `1, 2, 4, 8`; any other value is a programmer error.
#[inline(always)]
pub fn reduce_mod<const K: u64>(x: u64, q: u64) -> u64 {
    debug_assert!(
        matches!(K, 1 | 2 | 4 | 8),
        "reduce_mod only supports K in {{1, 2, 4, 8}}, got {K}"
    );
    debug_assert!(x < K * q, "x = {x} is not < {K} * q = {}", K * q);

    let mut r = x;
    if K >= 8 && r >= 4 * q {
        r -= 4 * q;
    }
    if K >= 4 && r >= 2 * q {
        r -= 2 * q;
    }
    if K >= 2 && r >= q {
        r -= q;
    }
    r
}

/// Full-precision modular multiplication with no precomputed factor:
/// `(x * y) mod q`. Requires `x, y < q`. This is the reference variant
/// used outside the NTT hot loop (`pow_mod`, the pure cross-validation
/// transform); the hot loop instead uses [`mul_mod_lazy`] with a
/// precomputed [`crate::modulus::barrett_factor::MultiplyFactor`].
#[inline]
pub fn mul_mod(x: u64, y: u64, q: u64) -> u64 {
    debug_assert!(x < q && y < q, "mul_mod operands must be reduced mod q");
    let product = (x as u128) * (y as u128);
    (product % (q as u128)) as u64
}

/// Modular multiplication using a precomputed Barrett factor for `y`:
/// `y_precon = floor((y << 64) / q)`. Equivalent to [`mul_mod`] but avoids
/// the 128-bit division.
#[inline]
pub fn mul_mod_precomputed(x: u64, y: u64, y_precon: u64, q: u64) -> u64 {
    debug_assert!(x < q && y < q, "mul_mod_precomputed operands must be reduced mod q");
    let lazy = mul_mod_lazy::<64>(x, y, y_precon, q);
    reduce_mod::<2>(lazy, q)
}

/// Lazy Barrett modular multiplication: returns a value congruent to
/// `x * y (mod q)` in `[0, 2q)`, deferring the final conditional subtract
/// to the caller (or to the next butterfly stage, per the Harvey
/// discipline). `S` is the shift used for both the Barrett factor `q_barr`
/// and the high-multiply that estimates the quotient; `S ∈ {52, 64}` in
/// practice (52 for the IFMA path, 64 for the default path).
///
/// Preconditions: `y < q`, `x <= max value representable in S bits`,
/// `q <= max value representable in S bits`.
#[inline(always)]
pub fn mul_mod_lazy<const S: u32>(x: u64, y: u64, y_precon: u64, q: u64) -> u64 {
    debug_assert!(y < q, "y = {y} must be < q = {q}");
    let quotient_estimate = mul_hi_u64::<S>(x, y_precon);
    x.wrapping_mul(y)
        .wrapping_sub(quotient_estimate.wrapping_mul(q))
}

/// Modular exponentiation by squaring: `base^exp mod q`.
pub fn pow_mod(mut base: u64, mut exp: u64, q: u64) -> u64 {
    debug_assert!(q > 1, "modulus must be > 1");
    base %= q;
    let mut result = 1u64 % q;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, q);
        }
        base = mul_mod(base, base, q);
        exp >>= 1;
    }
    result
}

/// Modular multiplicative inverse of `x` modulo `q`, via the extended
/// Euclidean algorithm. Returns [`KernelError::NoInverse`] if
/// `gcd(x, q) != 1`.
pub fn inv_mod(x: u64, q: u64) -> Result<u64> {
    if q == 0 {
        return Err(KernelError::InvalidArguments(
            "inv_mod: modulus must be non-zero".to_string(),
        ));
    }
    let (mut old_r, mut r) = (x as i128, q as i128);
    let (mut old_s, mut s) = (1i128, 0i128);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }

    if old_r != 1 {
        return Err(KernelError::NoInverse { x, q });
    }

    let inverse = old_s.rem_euclid(q as i128) as u64;
    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_mod_are_inverse() {
        let q = 97u64;
        for x in 0..q {
            for y in 0..q {
                let sum = add_mod(x, y, q);
                assert_eq!(sub_mod(sum, y, q), x);
            }
        }
    }

    #[test]
    fn mul_mod_matches_u128_reference() {
        let q = 1_000_000_007u64;
        assert_eq!(mul_mod(12345, 67890, q), 760986341);
    }

    #[test]
    fn mul_mod_lazy_is_congruent_and_bounded() {
        let q = 0xFFFF_EE00_1u64; // 60-bit NTT-friendly prime
        let y = 123456789u64;
        let y_precon = crate::modulus::barrett_factor::MultiplyFactor::new(y, 64, q)
            .unwrap()
            .barrett_factor();
        for x in [0u64, 1, q - 1, q / 2, 999999937] {
            let lazy = mul_mod_lazy::<64>(x, y, y_precon, q);
            assert!(lazy < 2 * q, "lazy result {lazy} not in [0, 2q)");
            assert_eq!(lazy % q, (x as u128 * y as u128 % q as u128) as u64);
        }
    }

    #[test]
    fn reduce_mod_matches_naive_modulo() {
        let q = 17u64;
        for k_mul in [1u64, 2, 4, 8] {
            for x in 0..(k_mul * q) {
                let expected = x % q;
                let actual = match k_mul {
                    1 => reduce_mod::<1>(x, q),
                    2 => reduce_mod::<2>(x, q),
                    4 => reduce_mod::<4>(x, q),
                    8 => reduce_mod::<8>(x, q),
                    _ => unreachable!(),
                };
                assert_eq!(actual, expected);
            }
        }
    }

    #[test]
    fn barrett_reduce64_matches_naive_modulo() {
        let q = 999999937u64;
        let q_barr = crate::integer::divide_u128_u64_lo(1, 0, q);
        for x in [0u64, 1, q - 1, q, q + 1, u64::MAX, 123456789012345] {
            assert_eq!(barrett_reduce64(x, q, q_barr), x % q);
        }
    }

    #[test]
    fn pow_mod_matches_reference() {
        let q = 1_000_000_007u64;
        assert_eq!(pow_mod(2, 10, q), 1024);
        assert_eq!(pow_mod(3, 0, q), 1);
    }

    #[test]
    fn inv_mod_round_trips() {
        let q = 1_000_000_007u64;
        for x in [1u64, 2, 3, 12345, q - 1] {
            let inverse = inv_mod(x, q).unwrap();
            assert_eq!(mul_mod(x, inverse, q), 1);
        }
    }

    #[test]
    fn inv_mod_rejects_non_coprime_input() {
        let q = 100u64;
        assert_eq!(inv_mod(10, q), Err(KernelError::NoInverse { x: 10, q }));
    }

    use proptest::prelude::*;

    proptest! {
        /// `mul_mod_lazy::<64>` must be congruent to the exact product mod
        /// `q` and land in `[0, 2q)`, for any in-range operands.
        #[test]
        fn mul_mod_lazy_is_congruent_and_bounded_for_arbitrary_operands(
            q in 3u64..=0x3FFF_FFFF_FFFF_FFFFu64,
            x_raw in any::<u64>(),
            y_raw in any::<u64>(),
        ) {
            let x = x_raw % q;
            let y = y_raw % q;
            let y_precon = crate::modulus::barrett_factor::MultiplyFactor::new(y, 64, q)
                .unwrap()
                .barrett_factor();
            let lazy = mul_mod_lazy::<64>(x, y, y_precon, q);
            prop_assert!(lazy < 2 * q);
            prop_assert_eq!(lazy % q, (x as u128 * y as u128 % q as u128) as u64);
        }

        /// `add_mod` then `sub_mod` by the same operand is the identity,
        /// for any in-range operands.
        #[test]
        fn add_then_sub_mod_is_identity_for_arbitrary_operands(
            q in 2u64..=1_000_000_000u64,
            x_raw in any::<u64>(),
            y_raw in any::<u64>(),
        ) {
            let x = x_raw % q;
            let y = y_raw % q;
            prop_assert_eq!(sub_mod(add_mod(x, y, q), y, q), x);
        }
    }
}
