pub mod errors;
pub mod param;
pub mod scores;

pub use errors::*;
pub use param::*;
pub use scores::*;
