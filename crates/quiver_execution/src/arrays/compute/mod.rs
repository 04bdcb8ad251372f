//! Vectorized kernels over typed vectors.

pub mod arith;
pub mod cmp;
pub mod filter;
pub mod logic;

use quiver_error::{QuiverError, Result};

use super::vector::Vector;

/// Ensure two vectors may be zipped element-wise.
fn check_lengths(left: &Vector, right: &Vector) -> Result<()> {
    if left.len() != right.len() {
        return Err(QuiverError::illegal_state(format!(
            "Vector length mismatch: {} and {}",
            left.len(),
            right.len(),
        )));
    }
    Ok(())
}
