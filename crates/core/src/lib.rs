#![forbid(unsafe_code)]

pub mod distance;
pub mod instance;
pub mod math;
pub mod matrix;
pub mod options;
pub mod problem;
pub mod solution;
pub mod stats;
pub mod traits;

pub use distance::*;
pub use instance::*;
pub use math::*;
pub use matrix::*;
pub use options::*;
pub use problem::*;
pub use solution::*;
pub use stats::*;
pub use traits::*;
