//! Element-wise fused multiply-add modulo `q`: `out[i] = (arg1[i] * arg2 +
//! arg3[i]) mod q`, or `out[i] = (arg1[i] * arg2) mod q` when `arg3` is
//! absent. Independent of [`crate::ntt::Ntt`] — it takes raw spans and a
//! modulus rather than owning precomputed tables, since there is no
//! per-call setup to amortize beyond the single Barrett factor for
//! `arg2`.

use crate::cpu_features::Tier;
use crate::error::{KernelError, Result};
use crate::modulus::{mul_mod_lazy, reduce_mod, MultiplyFactor};

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

/// Computes `out[i] = (arg1[i] * arg2 + arg3[i]) mod q` for `i in 0..n`
/// (or without the `arg3[i]` term if `arg3` is `None`).
///
/// `out` may alias `arg1` and/or `arg3`: each output element depends only
/// on index `i` of the inputs, so index-wise aliasing is well-defined.
/// Every tier computes the fused value in a local before writing `out`,
/// so `out == arg1` (or `arg3`) never observes a partial write — a
/// two-statement `*out = mul; *out += add` body would be a defect for
/// exactly this reason; this implementation never splits the write.
///
/// # Errors
/// Returns [`KernelError::InvalidArguments`] if `q == 0`, `arg2 >= q`, any
/// input slice has length `!= n`, or `arg3` is `Some` with the wrong
/// length.
pub fn eltwise_fma_mod(
    arg1: &[u64],
    arg2: u64,
    arg3: Option<&[u64]>,
    out: &mut [u64],
    n: usize,
    q: u64,
) -> Result<()> {
    if q == 0 {
        return Err(KernelError::InvalidArguments(
            "eltwise_fma_mod: modulus must be non-zero".to_string(),
        ));
    }
    if arg2 >= q {
        return Err(KernelError::InvalidArguments(format!(
            "eltwise_fma_mod: arg2 = {arg2} must be < q = {q}"
        )));
    }
    if arg1.len() != n || out.len() != n {
        return Err(KernelError::InvalidArguments(format!(
            "eltwise_fma_mod: arg1/out length must equal n = {n}"
        )));
    }
    if let Some(a3) = arg3 {
        if a3.len() != n {
            return Err(KernelError::InvalidArguments(format!(
                "eltwise_fma_mod: arg3 length must equal n = {n}"
            )));
        }
    }
    debug_assert!(arg1.iter().all(|&v| v < q), "arg1 must be reduced mod q");
    if let Some(a3) = arg3 {
        debug_assert!(a3.iter().all(|&v| v < q), "arg3 must be reduced mod q");
    }

    let tier = Tier::for_modulus(q);
    crate::logging::kernel_trace!("ntt_kernel: eltwise_fma_mod(n={n}) tier={tier:?}");
    match tier {
        Tier::Ifma52 => {
            let precon = MultiplyFactor::new(arg2, 52, q)?.barrett_factor();
            #[cfg(target_arch = "x86_64")]
            // Safety: Tier::for_modulus only reports Ifma52 once
            // Tier::detect() has confirmed avx512ifma + avx512f.
            unsafe {
                run_simd_ifma(arg1, arg2, precon, arg3, out, q);
            }
            #[cfg(not(target_arch = "x86_64"))]
            unreachable!("Tier::detect() never reports SIMD capability off x86_64");
        }
        Tier::Avx512Dq64 => {
            let precon = MultiplyFactor::new(arg2, 64, q)?.barrett_factor();
            #[cfg(target_arch = "x86_64")]
            // Safety: Tier::for_modulus only reports Avx512Dq64 once
            // Tier::detect() has confirmed avx512dq + avx512f.
            unsafe {
                run_simd_avx512(arg1, arg2, precon, arg3, out, q);
            }
            #[cfg(not(target_arch = "x86_64"))]
            unreachable!("Tier::detect() never reports SIMD capability off x86_64");
        }
        Tier::Scalar64 => {
            let precon = MultiplyFactor::new(arg2, 64, q)?.barrett_factor();
            run_scalar::<64>(arg1, arg2, precon, arg3, out, q);
        }
    }
    debug_assert!(out.iter().all(|&v| v < q));
    Ok(())
}

/// 8-lanes-at-a-time kernel for the AVX-512DQ/F tier, with a scalar tail
/// for the `n % 8` remainder. `out` may alias `arg1`/`arg3`: each chunk is
/// fully loaded before anything in that chunk is stored.
///
/// # Safety
/// Caller must have confirmed `avx512f` + `avx512dq` via
/// [`crate::cpu_features::Tier::detect`].
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512dq")]
unsafe fn run_simd_avx512(arg1: &[u64], arg2: u64, arg2_precon: u64, arg3: Option<&[u64]>, out: &mut [u64], q: u64) {
    use crate::simd::avx512::{mul_mod_lazy_x8, reduce_if_ge};

    let n = arg1.len();
    let chunks = n / 8;
    let y_vec = _mm512_set1_epi64(arg2 as i64);
    let y_precon_vec = _mm512_set1_epi64(arg2_precon as i64);
    let q_vec = _mm512_set1_epi64(q as i64);

    match arg3 {
        Some(a3) => {
            for c in 0..chunks {
                let base = c * 8;
                let xv = _mm512_loadu_si512(arg1[base..].as_ptr() as *const i32);
                let a3v = _mm512_loadu_si512(a3[base..].as_ptr() as *const i32);
                let product = reduce_if_ge(mul_mod_lazy_x8(xv, y_vec, y_precon_vec, q_vec), q_vec, q_vec);
                let sum = reduce_if_ge(_mm512_add_epi64(product, a3v), q_vec, q_vec);
                _mm512_storeu_si512(out[base..].as_mut_ptr() as *mut i32, sum);
            }
            for i in (chunks * 8)..n {
                let product = mul_mod_lazy::<64>(arg1[i], arg2, arg2_precon, q);
                let sum = reduce_mod::<2>(product, q) + a3[i];
                out[i] = reduce_mod::<2>(sum, q);
            }
        }
        None => {
            for c in 0..chunks {
                let base = c * 8;
                let xv = _mm512_loadu_si512(arg1[base..].as_ptr() as *const i32);
                let product = reduce_if_ge(mul_mod_lazy_x8(xv, y_vec, y_precon_vec, q_vec), q_vec, q_vec);
                _mm512_storeu_si512(out[base..].as_mut_ptr() as *mut i32, product);
            }
            for i in (chunks * 8)..n {
                let product = mul_mod_lazy::<64>(arg1[i], arg2, arg2_precon, q);
                out[i] = reduce_mod::<2>(product, q);
            }
        }
    }
}

/// 8-lanes-at-a-time kernel for the AVX-512 IFMA-52 tier, with a scalar
/// tail for the `n % 8` remainder. Same aliasing contract as
/// [`run_simd_avx512`].
///
/// # Safety
/// Caller must have confirmed `avx512ifma` + `avx512f` via
/// [`crate::cpu_features::Tier::detect`].
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512ifma,avx512f")]
unsafe fn run_simd_ifma(arg1: &[u64], arg2: u64, arg2_precon: u64, arg3: Option<&[u64]>, out: &mut [u64], q: u64) {
    use crate::simd::ifma::{mul_mod_lazy_x8, reduce_if_ge};

    let n = arg1.len();
    let chunks = n / 8;
    let y_vec = _mm512_set1_epi64(arg2 as i64);
    let y_precon_vec = _mm512_set1_epi64(arg2_precon as i64);
    let q_vec = _mm512_set1_epi64(q as i64);

    match arg3 {
        Some(a3) => {
            for c in 0..chunks {
                let base = c * 8;
                let xv = _mm512_loadu_si512(arg1[base..].as_ptr() as *const i32);
                let a3v = _mm512_loadu_si512(a3[base..].as_ptr() as *const i32);
                let product = reduce_if_ge(mul_mod_lazy_x8(xv, y_vec, y_precon_vec, q_vec), q_vec, q_vec);
                let sum = reduce_if_ge(_mm512_add_epi64(product, a3v), q_vec, q_vec);
                _mm512_storeu_si512(out[base..].as_mut_ptr() as *mut i32, sum);
            }
            for i in (chunks * 8)..n {
                let product = mul_mod_lazy::<52>(arg1[i], arg2, arg2_precon, q);
                let sum = reduce_mod::<2>(product, q) + a3[i];
                out[i] = reduce_mod::<2>(sum, q);
            }
        }
        None => {
            for c in 0..chunks {
                let base = c * 8;
                let xv = _mm512_loadu_si512(arg1[base..].as_ptr() as *const i32);
                let product = reduce_if_ge(mul_mod_lazy_x8(xv, y_vec, y_precon_vec, q_vec), q_vec, q_vec);
                _mm512_storeu_si512(out[base..].as_mut_ptr() as *mut i32, product);
            }
            for i in (chunks * 8)..n {
                let product = mul_mod_lazy::<52>(arg1[i], arg2, arg2_precon, q);
                out[i] = reduce_mod::<2>(product, q);
            }
        }
    }
}

/// Portable fallback kernel, used directly for the [`Tier::Scalar64`]
/// case and as the `n % 8` tail for both SIMD kernels above.
fn run_scalar<const S: u32>(
    arg1: &[u64],
    arg2: u64,
    arg2_precon: u64,
    arg3: Option<&[u64]>,
    out: &mut [u64],
    q: u64,
) {
    match arg3 {
        Some(a3) => {
            for i in 0..arg1.len() {
                let product = mul_mod_lazy::<S>(arg1[i], arg2, arg2_precon, q);
                let sum = reduce_mod::<2>(product, q) + a3[i];
                out[i] = reduce_mod::<2>(sum, q);
            }
        }
        None => {
            for i in 0..arg1.len() {
                let product = mul_mod_lazy::<S>(arg1[i], arg2, arg2_precon, q);
                out[i] = reduce_mod::<2>(product, q);
            }
        }
    }
}
