//! Scalar reference implementation of the Harvey forward/inverse butterfly,
//! plus the pure (non-Barrett) transform used for cross-validation.
//!
//! The butterfly bodies are generic over the Barrett shift `S` so the same
//! source serves both the default 64-bit path and (via [`super::Ntt`]'s
//! 52-bit root tables) the scalar fallback a caller would reach for if the
//! IFMA tables were ever exercised outside the SIMD backend, e.g. in tests.
//! `S` is always `52` or `64` in practice.

use super::tables::RootTable;
use crate::modulus::{add_mod, mul_mod, mul_mod_lazy, sub_mod};

/// Forward Harvey butterfly, natural order in, bit-reversed order out.
/// `elements` holds `n` coefficients in `[0, q)`; `table` is the forward
/// root-power table (bit-reversed indexing).
///
/// Maintains the `[0, 4q)` lazy invariant inductively at every level and
/// performs the two-stage conditional-subtract normalization pass at the
/// end, landing every output in `[0, q)`.
pub(super) fn forward<const S: u32>(elements: &mut [u64], table: &RootTable, q: u64) {
    let n = elements.len();
    debug_assert!(n.is_power_of_two() && n >= 2);
    let two_q = 2 * q;
    let four_q = 4 * q;

    let mut t = n / 2;
    let mut m = 1usize;
    while m < n {
        let mut j1 = 0usize;
        for i in 0..m {
            let (w, w_precon) = table.at(m + i);
            let j2 = j1 + t;
            for j in j1..j2 {
                debug_assert!(elements[j] < four_q && elements[j + t] < four_q);
                let x = if elements[j] >= two_q {
                    elements[j] - two_q
                } else {
                    elements[j]
                };
                let prod = mul_mod_lazy::<S>(elements[j + t], w, w_precon, q);
                elements[j] = x + prod;
                elements[j + t] = x + two_q - prod;
            }
            j1 += 2 * t;
        }
        t /= 2;
        m *= 2;
    }

    for e in elements.iter_mut() {
        if *e >= two_q {
            *e -= two_q;
        }
        if *e >= q {
            *e -= q;
        }
    }
}

/// Inverse Gentleman-Sande butterfly, bit-reversed order in, natural order
/// out. `table` is the inverse root-power table; `inv_n`/`inv_n_precon`
/// and `inv_n_times_root`/`inv_n_times_root_precon` are the final level's
/// fused-normalization multipliers built by
/// [`super::tables::Tables::build`].
#[allow(clippy::too_many_arguments)]
pub(super) fn inverse<const S: u32>(
    elements: &mut [u64],
    table: &RootTable,
    inv_n: u64,
    inv_n_precon: u64,
    inv_n_times_root: u64,
    inv_n_times_root_precon: u64,
    q: u64,
) {
    let n = elements.len();
    debug_assert!(n.is_power_of_two() && n >= 2);
    let two_q = 2 * q;

    let mut t = 1usize;
    let mut idx = 1usize;
    let mut m = n / 2;
    while m > 1 {
        let mut j1 = 0usize;
        for _ in 0..m {
            let (w, w_precon) = table.at(idx);
            idx += 1;
            let j2 = j1 + t;
            for j in j1..j2 {
                let tx_raw = elements[j] + elements[j + t];
                let tx = if tx_raw >= two_q { tx_raw - two_q } else { tx_raw };
                let ty = elements[j] + two_q - elements[j + t];
                elements[j] = tx;
                elements[j + t] = mul_mod_lazy::<S>(ty, w, w_precon, q);
            }
            j1 += 2 * t;
        }
        t *= 2;
        m /= 2;
    }

    // Final level, fused with the 1/N scaling.
    let half = n / 2;
    for j in half..n {
        let tx_raw = elements[j - half] + elements[j];
        let tx = if tx_raw >= two_q { tx_raw - two_q } else { tx_raw };
        let ty = elements[j - half] + two_q - elements[j];
        elements[j - half] = mul_mod_lazy::<S>(tx, inv_n, inv_n_precon, q);
        elements[j] = mul_mod_lazy::<S>(ty, inv_n_times_root, inv_n_times_root_precon, q);
    }

    for e in elements.iter_mut() {
        if *e >= two_q {
            *e -= two_q;
        }
        if *e >= q {
            *e -= q;
        }
    }
}

/// Pure (no Barrett precomputation) forward transform built from
/// [`add_mod`]/[`sub_mod`]/[`mul_mod`]. Used only for cross-validating the
/// fast scalar and SIMD variants in tests;
/// never on the hot path.
pub fn reference_forward(elements: &mut [u64], root: u64, q: u64) {
    let n = elements.len();
    debug_assert!(n.is_power_of_two() && n >= 2);
    let log_n = n.trailing_zeros();

    let mut t = n / 2;
    let mut m = 1usize;
    while m < n {
        let mut j1 = 0usize;
        for i in 0..m {
            let exponent = crate::integer::reverse_bits((m + i) as u64, log_n);
            let w = crate::modulus::pow_mod(root, exponent, q);
            let j2 = j1 + t;
            for j in j1..j2 {
                let u = elements[j];
                let v = mul_mod(elements[j + t], w, q);
                elements[j] = add_mod(u, v, q);
                elements[j + t] = sub_mod(u, v, q);
            }
            j1 += 2 * t;
        }
        t /= 2;
        m *= 2;
    }
}
