pub mod aggregate;
pub mod sentiment;
pub mod speaker;

pub use aggregate::*;
pub use sentiment::*;
pub use speaker::*;
