mod ratio;
mod lpoly;
mod grid;

pub use ratio::*;
pub use lpoly::*;
pub use grid::*;
