pub mod assembler;
pub mod format;
pub mod resolver;

pub use assembler::{Assembler, Recommendations};
pub use format::format;
pub use resolver::{MatchTier, Resolution, Resolver};
