mod mat;
mod snf;

pub use mat::*;
pub use snf::*;
