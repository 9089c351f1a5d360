/// The runtime value type and its accessors.
pub mod core;
/// Dense 2-D matrices and their linear-algebra kernels.
pub mod matrix;

pub use self::core::Value;
pub use self::matrix::Matrix;
