//! Dual problem construction for the three supported formulations

pub mod problem;
pub mod vmatrix;

pub use self::problem::*;
pub use self::vmatrix::*;
