//! BabyJubJub curve primitives and wire types for confidential balances.

pub mod curve;
pub mod types;
pub mod encode;

// Re-export all public items from modules for convenience
pub use curve::*;
pub use types::*;
pub use encode::*;
