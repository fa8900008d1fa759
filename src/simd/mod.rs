//! Vectorized modular-arithmetic primitives shared by the NTT butterfly
//! ([`crate::ntt`]) and the element-wise FMA kernel
//! ([`crate::eltwise_fma`]) — the two places the dispatch shim hands off
//! to a SIMD path. Both are embarrassingly-parallel-per-lane uses of the
//! same lazy Barrett multiply, so the 8-wide `mul_mod_lazy_x8` in each
//! backend is the one piece of vector code; the NTT butterfly and the
//! FMA loop just wire it into different surrounding arithmetic.
//!
//! Every function here requires its backing CPU feature to have been
//! confirmed present by [`crate::cpu_features::Tier::detect`] before being
//! called; none of them probe CPUID themselves.

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx512;
#[cfg(target_arch = "x86_64")]
pub(crate) mod ifma;
