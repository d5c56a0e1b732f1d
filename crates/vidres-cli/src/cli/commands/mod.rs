//! CLI command handlers, one file per command.

mod cache;
mod completions;
mod decrypt;
mod normalize;
mod resolve;

pub use cache::{run_cache_clear, run_cache_show};
pub use completions::run_completions;
pub use decrypt::run_decrypt;
pub use normalize::run_normalize;
pub use resolve::run_resolve;
