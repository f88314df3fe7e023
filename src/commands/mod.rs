/// Command implementations.
pub mod list;

pub use list::{ListOptions, RunStatus, run};
