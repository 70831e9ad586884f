pub mod roles;
pub mod segmenter;

pub use roles::*;
pub use segmenter::*;
