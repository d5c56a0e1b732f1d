pub mod catalog;
pub mod config;
pub mod decrypt;
pub mod error;
pub mod fallback;
pub mod http;
pub mod logging;
pub mod orchestrator;
pub mod resolver;
pub mod retry;
pub mod url_model;

pub use error::{ErrorKind, ResolveError};
