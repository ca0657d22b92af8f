pub mod collector;
pub mod config;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod paths;
pub mod scaffold;
pub mod status;
pub mod transition;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod fixture;

pub use error::{CrumblerError, ErrorKind, Result, ValidationError};
pub use types::{EntityKind, Status};
