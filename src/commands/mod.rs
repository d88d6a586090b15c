//! Command handlers for the CLI binary.

mod new;

pub use new::{execute_new, NewOptions};
