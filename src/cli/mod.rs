/// CLI layer: argument parsing and output formatting.
pub mod args;
pub mod output;

pub use args::{Cli, report_parse_error};
pub use output::OutputCtx;
