//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module and receives the kernel, the
//! effective configuration and the output writer.

mod completions;
mod config;
mod detect;
mod lift;
mod lower;
mod operators;
mod translate;
mod utils;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use detect::handle_detect;
pub use lift::handle_lift;
pub use lower::handle_lower;
pub use operators::handle_operators;
pub use translate::handle_translate;
pub use validate::handle_validate;
