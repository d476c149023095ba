mod mag;
mod hom;
mod pairing;
mod linking;

pub use mag::*;
pub use hom::*;
pub use pairing::*;
pub use linking::*;
