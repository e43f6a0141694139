pub mod adjacency;
pub mod selector;

pub use adjacency::{adjacent_sum, collapse, narrow, Narrowing};
pub use selector::leaders;
