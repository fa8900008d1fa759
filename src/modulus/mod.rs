//! Modular-arithmetic substrate: Barrett factors, lazy reductions, and the
//! add/sub/mul/pow/inverse primitives the NTT and FMA kernels are built on.

pub mod arithmetic;
pub mod barrett_factor;

pub use arithmetic::{
    add_mod, barrett_reduce64, inv_mod, mul_mod, mul_mod_lazy, mul_mod_precomputed, pow_mod,
    reduce_mod, sub_mod,
};
pub use barrett_factor::{MultiplyFactor, Shift};
