//! Negacyclic Number-Theoretic Transform and Barrett modular-arithmetic
//! kernels for homomorphic-encryption workloads: prime fields up to a
//! 62-bit modulus, power-of-two transform lengths, scalar and AVX-512
//! (IFMA-52 / DQ-64) backends that are bit-identical on well-formed
//! input.
//!
//! The two public entry points are [`Ntt`] (forward/inverse transform)
//! and [`eltwise_fma_mod`] (element-wise fused multiply-add mod `q`);
//! everything else in this crate is the substrate they're built from
//! ([`modulus`], [`integer`], [`number_theory`]) and is exposed for
//! callers that want to compose their own kernels on top of it.
//!
//! Backend selection is automatic and runtime-probed (see
//! [`cpu_features::Tier`]); there is nothing to configure. Set the
//! `NTT_KERNEL_LOG` environment variable (`error`, `debug`, or `trace`)
//! together with the `trace` Cargo feature to see table-construction and
//! dispatch-tier traces through the `log` crate.

pub mod cpu_features;
pub mod error;
pub mod eltwise_fma;
pub mod integer;
mod logging;
pub mod modulus;
pub mod ntt;
pub mod number_theory;
mod simd;

pub use cpu_features::Tier;
pub use error::{KernelError, Result};
pub use eltwise_fma::eltwise_fma_mod;
pub use ntt::{reference_forward, Ntt};
