//! Kernel functions and Gram matrix construction

pub mod gram;
pub mod kind;
pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod traits;

pub use self::gram::*;
pub use self::kind::*;
pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::traits::*;
