//! Genome structures: gametes and diploid individuals.

mod gamete;
mod individual;

pub use gamete::{Gamete, GameteKey};
pub use individual::Individual;
