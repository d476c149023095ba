mod sign;
mod digits;
mod int_ext;
mod ext_int;

pub use sign::*;
pub use digits::*;
pub use int_ext::*;
pub use ext_int::*;
