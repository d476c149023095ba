mod arith;
mod det;

pub use arith::*;
pub use det::*;
