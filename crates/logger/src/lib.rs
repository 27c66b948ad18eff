//! Tracing initialization shared by the Syncbeat binaries.

mod tracing;

pub use tracing::{init, init_with_level};
