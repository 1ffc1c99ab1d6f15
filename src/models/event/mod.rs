pub mod queries;
pub mod recurrence;
pub mod types;

pub use queries::*;
pub use types::*;
