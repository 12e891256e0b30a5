//! Shared primitives: frame timing, sizes, the error taxonomy and blend arithmetic.

pub mod core;
pub mod error;
pub(crate) mod math;
