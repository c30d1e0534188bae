//! Data loading and dataset implementations
//!
//! Both loaders produce dense feature rows and map labels onto {-1, +1}
//! by sign.

pub mod csv;
pub mod libsvm;

pub use self::csv::*;
pub use self::libsvm::*;
