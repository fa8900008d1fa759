//! Error taxonomy for this crate.
//!
//! Every variant corresponds to one of the error kinds named in the
//! component design: precondition failures surface as [`KernelError`]
//! rather than panicking, with the single exception of
//! [`KernelError::InternalRangeViolation`], which marks a broken internal
//! invariant (a bug in this crate, not a caller error) and is only ever
//! produced from a `debug_assert!`-guarded path.

use thiserror::Error;

/// Errors produced by the modular-arithmetic and NTT kernels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KernelError {
    /// A public entry point received arguments outside its contract:
    /// `N` not a power of two, `N < 2`, `q == 0`, `q` not satisfying
    /// `q ≡ 1 (mod 2N)`, an unsupported Barrett shift, or an operand
    /// larger than the modulus.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// `inv_mod` was called on an `x` that is not coprime with `q`.
    #[error("{x} has no inverse modulo {q}: gcd(x, q) != 1")]
    NoInverse { x: u64, q: u64 },

    /// `generate_primitive_root` exhausted its trial budget without
    /// finding a primitive `degree`-th root of unity modulo `q`.
    #[error("no primitive {degree}-th root of unity found modulo {q}")]
    NoPrimitiveRoot { degree: u64, q: u64 },

    /// `generate_primes` could not find enough primes satisfying the
    /// NTT-friendliness constraint within its search range.
    #[error("requested {requested} NTT-friendly primes, found only {found}")]
    NotEnoughPrimes { requested: usize, found: usize },

    /// A reduction produced a value outside the range the algorithm's
    /// invariant guarantees. This indicates a bug in this crate; the
    /// variant exists so debug builds can assert on it without that
    /// assertion surviving into release (the `debug_assert!` that would
    /// raise it is a no-op there).
    #[error("internal range invariant violated: {0}")]
    InternalRangeViolation(&'static str),
}

pub type Result<T> = core::result::Result<T, KernelError>;
