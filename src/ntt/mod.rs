//! The negacyclic NTT engine: per-modulus precomputed root-of-unity
//! tables and the forward/inverse Harvey-butterfly transforms built on
//! them, dispatched at runtime to a scalar or SIMD backend.

mod scalar;
pub(crate) mod tables;

use tables::Tables;

use crate::cpu_features::Tier;
use crate::error::{KernelError, Result};
use crate::modulus::inv_mod;
use crate::number_theory::minimal_primitive_root;

pub use scalar::reference_forward;

/// An immutable, precomputed NTT instance for one `(N, q)` pair (and,
/// implicitly, the root `ω` used to seed it).
///
/// Construction is the expensive part (root-power table generation,
/// `O(N log N)` modular exponentiations); `forward`/`inverse` are pure
/// in-place transforms over a caller-owned buffer and perform no
/// allocation. `Ntt` is `Send + Sync`: it never mutates after
/// construction, so concurrent transforms of disjoint buffers on
/// different threads are safe; concurrent transforms that write
/// overlapping buffers are the caller's race to avoid.
pub struct Ntt {
    n: usize,
    log_n: u32,
    q: u64,
    root: u64,
    root_inv: u64,
    /// Root tables at Barrett shift 64, used by the scalar and AVX-512DQ
    /// backends.
    tables64: Tables,
    /// Root tables at Barrett shift 52, built only when the IFMA tier is
    /// actually reachable for this modulus (`q < 2^50`); `None` otherwise,
    /// since building them is wasted work no backend would ever read.
    tables52: Option<Tables>,
    forward_tier: Tier,
    inverse_tier: Tier,
}

impl Ntt {
    /// Builds an `Ntt` for a transform of length `n` modulo `q`, computing
    /// the canonical root `ω = MinimalPrimitiveRoot(2n, q)` (root-choice
    /// canonicalization, so two implementations constructing an `Ntt` for
    /// the same `(n, q)` without an explicit root always agree on which
    /// one is in use).
    pub fn new(n: u64, q: u64) -> Result<Self> {
        Self::validate_shape(n, q)?;
        let root = minimal_primitive_root(2 * n, q).map_err(|_| {
            KernelError::InvalidArguments(format!(
                "no primitive {}-th root of unity exists modulo {q}; q must be NTT-friendly (q ≡ 1 mod {})",
                2 * n,
                2 * n
            ))
        })?;
        Self::with_root(n, q, root)
    }

    /// Builds an `Ntt` using a caller-supplied root `ω`. Validity of `ω`
    /// as a primitive `2n`-th root of unity is the caller's
    /// responsibility; this constructor only checks the shape invariants
    /// every `Ntt` requires regardless of how `ω` was chosen.
    pub fn with_root(n: u64, q: u64, root: u64) -> Result<Self> {
        Self::validate_shape(n, q)?;
        if root == 0 || root >= q {
            return Err(KernelError::InvalidArguments(format!(
                "root {root} must be in (0, {q})"
            )));
        }

        let n_usize = n as usize;
        let log_n = n.trailing_zeros();
        let root_inv = inv_mod(root, q)?;

        let tables64 = Tables::build(n_usize, log_n, root, root_inv, q, 64);
        let forward_tier = Tier::for_modulus(q);
        let inverse_tier = Tier::for_modulus_inverse(q);
        let tables52 = if forward_tier == Tier::Ifma52 {
            Some(Tables::build(n_usize, log_n, root, root_inv, q, 52))
        } else {
            None
        };

        crate::logging::kernel_debug!(
            "ntt_kernel: Ntt::new(n={n}, q={q}) root={root} forward_tier={forward_tier:?} inverse_tier={inverse_tier:?}"
        );

        Ok(Self {
            n: n_usize,
            log_n,
            q,
            root,
            root_inv,
            tables64,
            tables52,
            forward_tier,
            inverse_tier,
        })
    }

    fn validate_shape(n: u64, q: u64) -> Result<()> {
        if n < 2 || !n.is_power_of_two() {
            return Err(KernelError::InvalidArguments(format!(
                "N = {n} must be a power of two >= 2"
            )));
        }
        if q < 2 {
            return Err(KernelError::InvalidArguments(format!(
                "q = {q} must be >= 2"
            )));
        }
        if (q - 1) % (2 * n) != 0 {
            return Err(KernelError::InvalidArguments(format!(
                "q = {q} must satisfy q ≡ 1 (mod 2N) with N = {n}, so that a 2N-th root of unity exists"
            )));
        }
        Ok(())
    }

    /// Transform length.
    pub fn n(&self) -> u64 {
        self.n as u64
    }

    /// Modulus.
    pub fn q(&self) -> u64 {
        self.q
    }

    /// The canonical root `ω` this instance was built with (either
    /// computed by [`Ntt::new`] or supplied to [`Ntt::with_root`]).
    pub fn root(&self) -> u64 {
        self.root
    }

    /// `ω^{-1} mod q`, the root seeding the inverse-transform tables.
    pub fn root_inv(&self) -> u64 {
        self.root_inv
    }

    /// `log2(N)`.
    pub fn log_n(&self) -> u32 {
        self.log_n
    }

    /// Which backend [`Ntt::forward`] resolves to on this instance.
    pub fn forward_tier(&self) -> Tier {
        self.forward_tier
    }

    /// Which backend [`Ntt::inverse`] resolves to on this instance.
    pub fn inverse_tier(&self) -> Tier {
        self.inverse_tier
    }

    fn check_buffer(&self, elements: &[u64]) -> Result<()> {
        if elements.len() != self.n {
            return Err(KernelError::InvalidArguments(format!(
                "buffer length {} does not match transform length {}",
                elements.len(),
                self.n
            )));
        }
        debug_assert!(
            elements.iter().all(|&e| e < self.q),
            "every input coefficient must be in [0, q)"
        );
        Ok(())
    }

    /// Forward negacyclic NTT, in place: natural order in, bit-reversed
    /// order out. Input and output coefficients are both in `[0, q)`.
    pub fn forward(&self, elements: &mut [u64]) -> Result<()> {
        self.check_buffer(elements)?;
        crate::logging::kernel_trace!("ntt_kernel: forward(n={}) tier={:?}", self.n, self.forward_tier);

        match self.forward_tier {
            #[cfg(target_arch = "x86_64")]
            Tier::Ifma52 => {
                let tables52 = self
                    .tables52
                    .as_ref()
                    .expect("tables52 is built whenever forward_tier resolves to Ifma52");
                // Safety: forward_tier only resolves to Ifma52 when
                // Tier::detect() confirmed avx512ifma + avx512f.
                unsafe { crate::simd::ifma::forward(elements, &tables52.forward, self.q) };
            }
            #[cfg(target_arch = "x86_64")]
            Tier::Avx512Dq64 => {
                // Safety: forward_tier only resolves to Avx512Dq64 when
                // Tier::detect() confirmed avx512dq + avx512f.
                unsafe { crate::simd::avx512::forward(elements, &self.tables64.forward, self.q) };
            }
            #[cfg(not(target_arch = "x86_64"))]
            Tier::Ifma52 | Tier::Avx512Dq64 => {
                unreachable!("Tier::detect() never reports SIMD capability off x86_64")
            }
            Tier::Scalar64 => {
                scalar::forward::<64>(elements, &self.tables64.forward, self.q);
            }
        }
        debug_assert!(elements.iter().all(|&e| e < self.q));
        Ok(())
    }

    /// Inverse negacyclic NTT, in place: bit-reversed order in, natural
    /// order out, with the `1/N` scaling fused into the final level.
    pub fn inverse(&self, elements: &mut [u64]) -> Result<()> {
        self.check_buffer(elements)?;
        crate::logging::kernel_trace!("ntt_kernel: inverse(n={}) tier={:?}", self.n, self.inverse_tier);

        let t = &self.tables64;
        match self.inverse_tier {
            #[cfg(target_arch = "x86_64")]
            Tier::Avx512Dq64 => unsafe {
                // Safety: inverse_tier only resolves to Avx512Dq64 when
                // Tier::detect() confirmed avx512dq + avx512f.
                crate::simd::avx512::inverse(
                    elements,
                    &t.inverse,
                    t.inv_n,
                    t.inv_n_precon,
                    t.inv_n_times_root,
                    t.inv_n_times_root_precon,
                    self.q,
                );
            },
            #[cfg(not(target_arch = "x86_64"))]
            Tier::Avx512Dq64 => {
                unreachable!("Tier::detect() never reports SIMD capability off x86_64")
            }
            Tier::Scalar64 | Tier::Ifma52 => {
                // The IFMA tier never applies to the inverse transform
                // (see DESIGN.md); Tier::for_modulus_inverse never
                // produces Ifma52, so this arm is always the scalar path.
                scalar::inverse::<64>(
                    elements,
                    &t.inverse,
                    t.inv_n,
                    t.inv_n_precon,
                    t.inv_n_times_root,
                    t.inv_n_times_root_precon,
                    self.q,
                );
            }
        }
        debug_assert!(elements.iter().all(|&e| e < self.q));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_length() {
        assert!(matches!(
            Ntt::new(3, 17),
            Err(KernelError::InvalidArguments(_))
        ));
    }

    #[test]
    fn rejects_modulus_not_congruent_to_one_mod_two_n() {
        // N=8 requires q ≡ 1 (mod 16); 19 is prime but 19 % 16 = 3.
        assert!(matches!(
            Ntt::new(8, 19),
            Err(KernelError::InvalidArguments(_))
        ));
    }

    #[test]
    fn seed_case_forward_of_delta_is_root_powers_bit_reversed() {
        // N=8, q=17, input = delta at index 1.
        let ntt = Ntt::new(8, 17).unwrap();
        assert_eq!(ntt.root(), 3);

        let mut data = vec![0u64, 1, 0, 0, 0, 0, 0, 0];
        ntt.forward(&mut data).unwrap();

        // Expected[i] = ω^{br(i,3)} mod 17, ω = 3 (matches the forward
        // root table construction in ntt::tables::RootTable::build).
        let expected: Vec<u64> = (0..8u64)
            .map(|i| {
                let exp = crate::integer::reverse_bits(i, 3);
                crate::modulus::pow_mod(3, exp, 17)
            })
            .collect();
        assert_eq!(data, expected);
    }

    #[test]
    fn seed_case_delta_at_zero_round_trips() {
        // N=8, q=17, input = delta at index 0.
        let ntt = Ntt::new(8, 17).unwrap();
        let original = vec![1u64, 0, 0, 0, 0, 0, 0, 0];
        let mut data = original.clone();
        ntt.forward(&mut data).unwrap();
        ntt.inverse(&mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn round_trips_for_n_4_non_delta_input() {
        // N=4, q=17: regression for the inverse-table ordering bug, where
        // inverse(forward([1,2,3,4])) previously returned [1,2,10,3]
        // instead of the input.
        let ntt = Ntt::new(4, 17).unwrap();
        let original = vec![1u64, 2, 3, 4];
        let mut data = original.clone();
        ntt.forward(&mut data).unwrap();
        ntt.inverse(&mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn round_trips_on_random_coefficients_n_1024() {
        // N=1024, a 60-bit NTT-friendly prime.
        let n = 1024u64;
        let q = 0xFFFF_EE00_1u64;
        assert_eq!((q - 1) % (2 * n), 0, "q must be NTT-friendly for N=1024");

        let ntt = Ntt::new(n, q).unwrap();
        let mut state = 0x243F_6A88_85A3_08D3u64;
        let mut original = Vec::with_capacity(n as usize);
        for _ in 0..n {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            original.push(state % q);
        }

        let mut data = original.clone();
        ntt.forward(&mut data).unwrap();
        ntt.inverse(&mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn rejects_buffer_length_mismatch() {
        let ntt = Ntt::new(8, 17).unwrap();
        let mut wrong_len = vec![0u64; 4];
        assert!(matches!(
            ntt.forward(&mut wrong_len),
            Err(KernelError::InvalidArguments(_))
        ));
    }

    #[test]
    fn with_root_rejects_root_out_of_range() {
        assert!(matches!(
            Ntt::with_root(8, 17, 17),
            Err(KernelError::InvalidArguments(_))
        ));
        assert!(matches!(
            Ntt::with_root(8, 17, 0),
            Err(KernelError::InvalidArguments(_))
        ));
    }

    use proptest::prelude::*;

    proptest! {
        /// forward then inverse is the identity for arbitrary coefficients,
        /// at a fixed small (N, q) so every generated case is NTT-friendly.
        #[test]
        fn forward_then_inverse_round_trips_for_arbitrary_coefficients(
            coeffs in proptest::collection::vec(0u64..17, 8)
        ) {
            let ntt = Ntt::new(8, 17).unwrap();
            let mut data = coeffs.clone();
            ntt.forward(&mut data).unwrap();
            ntt.inverse(&mut data).unwrap();
            prop_assert_eq!(data, coeffs);
        }
    }
}
